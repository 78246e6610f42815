use serde::{Deserialize, Serialize};

/// Environment variables passed to the task, in declaration order.
///
/// Serialized as a plain array of `{ "key", "value" }` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskEnv(Vec<EnvVar>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EnvVar {
    key: String,
    value: String,
}

impl TaskEnv {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a variable. Later entries shadow earlier ones in [`TaskEnv::get`].
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(EnvVar {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|kv| (kv.key.as_str(), kv.value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::TaskEnv;

    #[test]
    fn last_entry_wins() {
        let mut env = TaskEnv::new();
        env.push("FOO", "one");
        env.push("BAR", "x");
        env.push("FOO", "two");

        assert_eq!(env.len(), 3);
        assert_eq!(env.get("FOO"), Some("two"));
        assert_eq!(env.get("BAR"), Some("x"));
        assert!(env.get("BAZ").is_none());
    }

    #[test]
    fn serializes_as_array() {
        let mut env = TaskEnv::new();
        env.push("FOO", "bar");

        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"[{"key":"FOO","value":"bar"}]"#);
    }
}
