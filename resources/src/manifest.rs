use crate::ManifestError;

/// Parsed resource manifest.
///
/// One `key 'value'` (or `key "value"`) pair per line; `--` and `#` start a
/// comment. Keys may repeat, every occurrence is kept in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    metadata: Vec<(String, String)>,
    scripts: Vec<String>,
    dependencies: Vec<String>,
    exports: Vec<String>,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut manifest = Manifest::default();

        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || is_comment(line) {
                continue;
            }

            let (key, value) = parse_line(line).map_err(|reason| ManifestError {
                line: index + 1,
                reason,
            })?;
            manifest.insert(key, value);
        }

        Ok(manifest)
    }

    fn insert(&mut self, key: &str, value: String) {
        match key {
            "script" | "shared_script" | "server_script" => self.scripts.push(value.clone()),
            "dependency" => self.dependencies.push(value.clone()),
            "export" | "server_export" => self.exports.push(value.clone()),
            _ => {}
        }
        self.metadata.push((key.to_string(), value));
    }

    /// All values recorded under `key`, in file order.
    pub fn metadata(&self, key: &str) -> Vec<&str> {
        self.metadata
            .iter()
            .filter(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn metadata_entries(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Script files to load on start, in declaration order.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    pub fn declares_export(&self, export: &str) -> bool {
        self.exports.iter().any(|declared| declared == export)
    }
}

fn is_comment(text: &str) -> bool {
    text.starts_with("--") || text.starts_with('#')
}

fn parse_line(line: &str) -> Result<(&str, String), &'static str> {
    let key_end = line
        .find(|c: char| c.is_whitespace() || c == '\'' || c == '"')
        .unwrap_or(line.len());
    let key = &line[..key_end];
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("invalid key");
    }

    let rest = line[key_end..].trim_start();
    let mut chars = rest.chars();
    let quote = match chars.next() {
        Some(quote @ ('\'' | '"')) => quote,
        Some(_) => return Err("value must be quoted"),
        None => return Err("missing value"),
    };

    let body = &rest[1..];
    let Some(value_end) = body.find(quote) else {
        return Err("unterminated string");
    };

    let trailing = body[value_end + 1..].trim();
    if !trailing.is_empty() && !is_comment(trailing) {
        return Err("unexpected text after value");
    }

    Ok((key, body[..value_end].to_string()))
}
