use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;

use failsafe_core::FailsafeEnvelope;
use failsafe_core::app::{DeadLetterRouter, FailsafeStage, RouteCounts, StageConfig};
use failsafe_core::conversion::convert_map_to_args;
use failsafe_core::domain::{DeadLetterRecord, ParseRow, Row};
use failsafe_core::impls::ChannelDeadLetterSink;
use failsafe_core::ports::DeadLetterSink;

const DEAD_LETTER_BUFFER: usize = 64;

/// Raw lines are bytes: a line that is not UTF-8 is a bad record, not a read error.
type RawLine = Vec<u8>;

/// Execute the `run` command: parse each input line into a row, print
/// successes to stdout and dead-letter records to `dead_letter` (stderr by default).
pub async fn execute(
    input: Option<&Path>,
    config_path: Option<&Path>,
    dead_letter: Option<&Path>,
    stage_name: &str,
    options: &[(String, String)],
) -> Result<()> {
    let config = load_config(config_path).await?;
    let options: BTreeMap<String, String> = options.iter().cloned().collect();

    tracing::info!(
        stage = stage_name,
        capture_stacktrace = config.capture_stacktrace,
        options = ?convert_map_to_args(&options),
        "Stage configured"
    );

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input: {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let dead_letter_out: Box<dyn AsyncWrite + Unpin + Send> = match dead_letter {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create dead-letter file: {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(tokio::io::stderr()),
    };

    let (sink, rx) = ChannelDeadLetterSink::<RawLine, RawLine>::new(DEAD_LETTER_BUFFER);
    let dead_letter_writer = tokio::spawn(write_dead_letters(rx, dead_letter_out));

    let stage = FailsafeStage::with_config(ParseRow, config);
    let router = DeadLetterRouter::new(stage_name, sink);
    let processed = process_lines(reader, tokio::io::stdout(), &stage, &router).await;

    // closes the channel; the writer drains what is buffered before finishing
    drop(router);
    let written = dead_letter_writer
        .await
        .context("dead-letter writer task failed")?;

    let counts = processed?;
    written?;

    tracing::info!(
        forwarded = counts.forwarded,
        dead_lettered = counts.dead_lettered,
        "Stage finished"
    );
    Ok(())
}

async fn load_config(path: Option<&Path>) -> Result<StageConfig> {
    let Some(path) = path else {
        return Ok(StageConfig::default());
    };
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    StageConfig::from_json(&json)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// stdout line for a parsed record.
#[derive(Serialize)]
struct RowLine<'a> {
    original: Cow<'a, str>,
    row: &'a Row,
}

/// Dead-letter line. Payloads are shown as text, invalid UTF-8 replaced.
#[derive(Serialize)]
struct DeadLetterLine<'a> {
    id: String,
    stage: &'a str,
    failed_at: String,
    original: Cow<'a, str>,
    current: Cow<'a, str>,
    error_message: Option<&'a str>,
    stacktrace: Option<&'a str>,
}

impl<'a> From<&'a DeadLetterRecord<RawLine, RawLine>> for DeadLetterLine<'a> {
    fn from(record: &'a DeadLetterRecord<RawLine, RawLine>) -> Self {
        let envelope = record.envelope();
        Self {
            id: record.id().to_string(),
            stage: record.stage(),
            failed_at: record.failed_at().to_rfc3339(),
            original: String::from_utf8_lossy(envelope.original()),
            current: String::from_utf8_lossy(envelope.current()),
            error_message: envelope.error_message(),
            stacktrace: envelope.stacktrace(),
        }
    }
}

async fn write_dead_letters<W>(
    mut rx: mpsc::Receiver<DeadLetterRecord<RawLine, RawLine>>,
    mut out: W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(record) = rx.recv().await {
        let mut line = serde_json::to_vec(&DeadLetterLine::from(&record))?;
        line.push(b'\n');
        out.write_all(&line).await?;
    }
    out.flush().await?;
    Ok(())
}

/// Blank lines are skipped. Each other line becomes one envelope; a trailing
/// `\r` is dropped.
async fn process_lines<R, W, S>(
    reader: R,
    mut out: W,
    stage: &FailsafeStage<ParseRow>,
    router: &DeadLetterRouter<S>,
) -> Result<RouteCounts>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: DeadLetterSink<RawLine, RawLine>,
{
    let mut segments = reader.split(b'\n');
    while let Some(mut line) = segments.next_segment().await.context("Failed to read input")? {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let outcome = stage.process(FailsafeEnvelope::ingest(line));
        if let Some(envelope) = router.route(outcome).await? {
            let row_line = RowLine {
                original: String::from_utf8_lossy(envelope.original()),
                row: envelope.current(),
            };
            let mut json = serde_json::to_vec(&row_line)?;
            json.push(b'\n');
            out.write_all(&json).await?;
        }
    }
    out.flush().await?;
    Ok(router.counts())
}
