use std::collections::BTreeMap;

use anyhow::Result;

use failsafe_core::conversion::{convert_map_to_args, convert_map_to_json_string};

/// Execute the `args` command. Later duplicates of a key win.
pub fn execute(pairs: &[(String, String)], json: bool) -> Result<()> {
    for line in render(pairs, json) {
        println!("{line}");
    }
    Ok(())
}

fn render(pairs: &[(String, String)], json: bool) -> Vec<String> {
    let map: BTreeMap<String, String> = pairs.iter().cloned().collect();
    if json {
        vec![convert_map_to_json_string(&map)]
    } else {
        convert_map_to_args(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<(String, String)> {
        vec![
            ("mode".to_string(), "fast".to_string()),
            ("batch".to_string(), "10".to_string()),
            ("mode".to_string(), "safe".to_string()),
        ]
    }

    #[test]
    fn renders_sorted_args_with_last_duplicate() {
        assert_eq!(render(&pairs(), false), vec!["--batch=10", "--mode=safe"]);
    }

    #[test]
    fn renders_json_object() {
        let out = render(&pairs(), true);
        let v: serde_json::Value = serde_json::from_str(&out[0]).unwrap();
        assert_eq!(v["mode"], "safe");
        assert_eq!(v["batch"], "10");
    }
}
