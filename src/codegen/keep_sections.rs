//! KEEP regions: hand-written code inside generated files.
//!
//! A region starts with `// KEEP <NAME> - ...` and ends with
//! `// KEEP <NAME> END`. When a file is regenerated, the body of each region
//! is copied over from the file already on disk.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::OnceLock;

use regex::{Captures, Regex};

pub const INCLUDES: &str = "INCLUDES";
pub const METHODS: &str = "METHODS";
pub const ITEMS: &str = "ITEMS";

fn region_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?ms)^([ \t]*// KEEP (\w+) - [^\n]*\n)(.*?)(^[ \t]*// KEEP (\w+) END)")
            .expect("KEEP region pattern is valid")
    })
}

/// Write an empty KEEP region at the given indentation.
pub fn write_region<W: Write>(writer: &mut W, indent: &str, name: &str) -> io::Result<()> {
    writeln!(
        writer,
        "{}// KEEP {} - put your custom {} here",
        indent,
        name,
        name.to_lowercase()
    )?;
    writeln!(writer, "{}// KEEP {} END", indent, name)
}

/// Collect region bodies keyed by region name.
///
/// Regions whose end marker names a different region are ignored.
pub fn extract(source: &str) -> HashMap<String, String> {
    region_pattern()
        .captures_iter(source)
        .filter(|caps| caps[2] == caps[5])
        .map(|caps| (caps[2].to_string(), caps[3].to_string()))
        .collect()
}

/// Replace region bodies in freshly generated code with those of the existing file.
pub fn merge(generated: &str, existing: &str) -> String {
    let kept = extract(existing);
    if kept.is_empty() {
        return generated.to_string();
    }

    region_pattern()
        .replace_all(generated, |caps: &Captures| {
            let body = if caps[2] == caps[5] {
                kept.get(&caps[2]).map(String::as_str).unwrap_or(&caps[3])
            } else {
                &caps[3]
            };
            format!("{}{}{}", &caps[1], body, &caps[4])
        })
        .into_owned()
}
