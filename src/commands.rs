/// Available commands and autocomplete logic
use crate::routes::Route;

/// What a command does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  /// Switch to a section.
  Go(Route),
  /// Re-request the current section, forcing where the route allows it.
  Reload,
  /// Drop every cached section payload.
  ClearCache,
  /// Exit folio.
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "main",
    aliases: &["m", "feed"],
    description: "Browse the main feed",
    action: CommandAction::Go(Route::Main),
  },
  Command {
    name: "collections",
    aliases: &["c", "collection"],
    description: "Browse curated collections",
    action: CommandAction::Go(Route::Collections),
  },
  Command {
    name: "screenshots",
    aliases: &["s", "shots"],
    description: "Browse screenshot groups",
    action: CommandAction::Go(Route::Screenshots),
  },
  Command {
    name: "videos",
    aliases: &["v", "video"],
    description: "Browse videos",
    action: CommandAction::Go(Route::Videos),
  },
  Command {
    name: "history",
    aliases: &["h", "log"],
    description: "Browse the site history",
    action: CommandAction::Go(Route::History),
  },
  Command {
    name: "about",
    aliases: &["a"],
    description: "About the author",
    action: CommandAction::Go(Route::About),
  },
  Command {
    name: "reload",
    aliases: &["r", "refresh"],
    description: "Reload the current section",
    action: CommandAction::Reload,
  },
  Command {
    name: "clear-cache",
    aliases: &["cc"],
    description: "Drop cached section data",
    action: CommandAction::ClearCache,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit folio",
    action: CommandAction::Quit,
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("videos");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "videos");
    assert_eq!(suggestions[0].action, CommandAction::Go(Route::Videos));
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("cc");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].action, CommandAction::ClearCache);
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("col");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "collections");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("shot");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "screenshots");
  }
}
