use crate::config;

/// Load settings, falling back to defaults. Returns a warning to log once
/// logging is up.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(msg) => (
                config::Settings::default(),
                Some(format!("invalid config, using defaults: {msg}")),
            ),
        },
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

/// The artist to browse: command-line words joined, or the configured one.
pub fn resolve_artist(args: impl IntoIterator<Item = String>, configured: &str) -> String {
    let words: Vec<String> = args.into_iter().collect();
    let joined = words.join(" ");
    let joined = joined.trim();
    if joined.is_empty() {
        configured.to_string()
    } else {
        joined.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_words_override_the_configured_artist() {
        let args = ["Arctic".to_string(), "Monkeys".to_string()];
        assert_eq!(resolve_artist(args, "Twenty One Pilots"), "Arctic Monkeys");
        assert_eq!(
            resolve_artist(Vec::<String>::new(), "Twenty One Pilots"),
            "Twenty One Pilots"
        );
        assert_eq!(resolve_artist([" ".to_string()], "X"), "X");
    }
}
