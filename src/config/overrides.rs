use std::path::PathBuf;

use toml::Value;

use super::ConfigError;
use super::types::GallerySettings;

impl GallerySettings {
    /// Set one dotted setting (e.g. `kmeans.k`) from its textual form.
    ///
    /// The raw text is parsed to the type of the current value. Lists and points
    /// are comma separated (`2,4,1`, `1.5,-3`). The result is re-normalized.
    pub fn apply_override(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        if key == "output_dir" {
            let trimmed = raw.trim();
            self.output_dir = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
            return Ok(());
        }
        let invalid = |reason: String| ConfigError::InvalidOverride {
            key: key.to_string(),
            reason,
        };
        let mut root = Value::try_from(&*self).map_err(|err| invalid(err.to_string()))?;
        let slot = lookup_mut(&mut root, key).ok_or_else(|| invalid("unknown setting".into()))?;
        *slot = parse_like(slot, raw).map_err(invalid)?;
        let updated: GallerySettings = root.try_into().map_err(|err: toml::de::Error| {
            invalid(err.message().to_string())
        })?;
        *self = updated.normalized();
        tracing::debug!(key, value = raw, "setting overridden");
        Ok(())
    }

    /// Expand a bare key to `section.key` when that section has it.
    pub fn qualify_key(&self, section: &str, key: &str) -> String {
        if key.contains('.') {
            return key.to_string();
        }
        let scoped = format!("{section}.{key}");
        let known = Value::try_from(self)
            .ok()
            .is_some_and(|mut root| lookup_mut(&mut root, &scoped).is_some());
        if known { scoped } else { key.to_string() }
    }
}

fn lookup_mut<'a>(root: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    key.split('.')
        .try_fold(root, |value, part| value.get_mut(part.trim()))
}

fn parse_like(current: &Value, raw: &str) -> Result<Value, String> {
    let text = raw.trim();
    match current {
        Value::String(_) => Ok(Value::String(text.to_string())),
        Value::Integer(_) => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|err| format!("expected an integer ({err})")),
        Value::Float(_) => parse_float(text).map(Value::Float),
        Value::Boolean(_) => parse_bool(text).map(Value::Boolean),
        Value::Array(items) => {
            let integers = items.first().is_some_and(Value::is_integer);
            text.split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| {
                    let part = part.trim();
                    if integers {
                        part.parse::<i64>()
                            .map(Value::Integer)
                            .map_err(|err| format!("expected integers ({err})"))
                    } else {
                        parse_float(part).map(Value::Float)
                    }
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Value::Table(table) if table.contains_key("x") && table.contains_key("y") => {
            let (x, y) = text
                .split_once(',')
                .ok_or_else(|| "expected `x,y`".to_string())?;
            let mut point = toml::map::Map::new();
            point.insert("x".into(), Value::Float(parse_float(x.trim())?));
            point.insert("y".into(), Value::Float(parse_float(y.trim())?));
            Ok(Value::Table(point))
        }
        _ => Err("this setting is a section; name one of its keys".to_string()),
    }
}

fn parse_float(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("expected a number, got {text:?}"))
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("expected true or false, got {text:?}")),
    }
}
