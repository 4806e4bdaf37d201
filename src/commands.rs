/// Available commands and autocomplete logic

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "clients",
    aliases: &["c", "cl"],
    description: "Your clients",
  },
  Command {
    name: "products",
    aliases: &["p", "pr"],
    description: "Product catalogue",
  },
  Command {
    name: "orders",
    aliases: &["o", "or"],
    description: "Your orders",
  },
  Command {
    name: "new-client",
    aliases: &["nc"],
    description: "Register a client",
  },
  Command {
    name: "new-product",
    aliases: &["np"],
    description: "Add a product",
  },
  Command {
    name: "new-order",
    aliases: &["no"],
    description: "Place an order",
  },
  Command {
    name: "top-sellers",
    aliases: &["ts", "sellers"],
    description: "Best salespeople by total sold",
  },
  Command {
    name: "top-clients",
    aliases: &["tc"],
    description: "Best clients by total bought",
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Sign out and clear cached data",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit crmtui",
  },
];

/// Look up a command by exact name or alias
pub fn find(input: &str) -> Option<&'static Command> {
  let input = input.trim().to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == input || cmd.aliases.contains(&input.as_str()))
}

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
    let suggestions = get_suggestions("orders");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "orders");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("p");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "products");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("new-o");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "new-order");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("seller");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "top-sellers");
  }

  #[test]
  fn test_find_by_alias_is_case_insensitive() {
    assert_eq!(find("NC").map(|c| c.name), Some("new-client"));
    assert_eq!(find(" clients ").map(|c| c.name), Some("clients"));
    assert!(find("boards").is_none());
  }
}
