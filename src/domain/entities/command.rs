use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Locale, Message, User};
use crate::application::errors::CommandError;
use crate::domain::traits::TaskScheduler;

/// Represents a bot command
pub struct Command {
    pub label: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub usage: Option<String>,
    pub handler: Option<CommandHandler>,
    pub permissions: Vec<String>,
}

/// Command handler function type
pub type CommandHandler =
    Box<dyn Fn(&CommandContext<'_>) -> Result<String, CommandError> + Send + Sync>;

/// Everything a command handler may consult while running
pub struct CommandContext<'a> {
    pub message: &'a Message,
    pub args: &'a [String],
    pub locale: &'a Locale,
    pub commands: &'a CommandRegistry,
    pub scheduler: Option<&'a dyn TaskScheduler>,
    pub prefix: &'a str,
}

impl Command {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            aliases: Vec::new(),
            usage: None,
            handler: None,
            permissions: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Whether `user` holds every permission this command requires
    pub fn allows(&self, user: Option<&User>) -> bool {
        self.permissions.is_empty()
            || user.is_some_and(|u| self.permissions.iter().all(|p| u.has_permission(p)))
    }

    pub fn execute(&self, ctx: &CommandContext<'_>) -> Result<String, CommandError> {
        if !self.allows(ctx.message.author.as_ref()) {
            return Err(CommandError::PermissionDenied);
        }
        match &self.handler {
            Some(handler) => handler(ctx),
            None => Ok(format!("Command {} not implemented", self.label)),
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("label", &self.label)
            .field("aliases", &self.aliases)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Entries {
    labels: HashMap<String, Arc<Command>>,
    /// alias -> label
    aliases: HashMap<String, String>,
}

impl Entries {
    fn claimed_as(&self, name: &str) -> Option<String> {
        if self.labels.contains_key(name) {
            Some(format!("command '{}'", name))
        } else {
            self.aliases
                .get(name)
                .map(|label| format!("an alias of '{}'", label))
        }
    }
}

/// Label and alias index of every invocable command.
///
/// Aliases never point at a command directly: they name a label, which is
/// then looked up again. An alias whose label is missing resolves to nothing.
#[derive(Default)]
pub struct CommandRegistry {
    entries: RwLock<Entries>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its label and all of its aliases.
    ///
    /// Rejects the whole command if any name is already taken; nothing is
    /// inserted in that case.
    pub fn register(&self, command: Command) -> Result<Arc<Command>, CommandError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CommandError::ExecutionFailed("Lock poisoned".to_string()))?;

        if let Some(existing) = entries.claimed_as(&command.label) {
            return Err(CommandError::Conflict {
                name: command.label.clone(),
                existing,
            });
        }

        let mut seen: Vec<&str> = vec![command.label.as_str()];
        for alias in &command.aliases {
            if let Some(existing) = entries.claimed_as(alias) {
                return Err(CommandError::Conflict {
                    name: alias.clone(),
                    existing,
                });
            }
            if seen.contains(&alias.as_str()) {
                return Err(CommandError::Conflict {
                    name: alias.clone(),
                    existing: format!("a name of '{}'", command.label),
                });
            }
            seen.push(alias);
        }

        let label = command.label.clone();
        for alias in &command.aliases {
            entries.aliases.insert(alias.clone(), label.clone());
        }
        let command = Arc::new(command);
        entries.labels.insert(label.clone(), Arc::clone(&command));

        tracing::debug!(label = %label, aliases = command.aliases.len(), "Registered command");
        Ok(command)
    }

    /// Point an extra alias at a label. The label does not have to exist yet.
    pub fn alias(
        &self,
        alias: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<(), CommandError> {
        let alias = alias.into();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CommandError::ExecutionFailed("Lock poisoned".to_string()))?;

        if let Some(existing) = entries.claimed_as(&alias) {
            return Err(CommandError::Conflict {
                name: alias,
                existing,
            });
        }
        entries.aliases.insert(alias, label.into());
        Ok(())
    }

    /// Find a command by label, falling back to alias -> label
    pub fn resolve(&self, name: &str) -> Option<Arc<Command>> {
        let entries = self.entries.read().ok()?;
        if let Some(command) = entries.labels.get(name) {
            return Some(Arc::clone(command));
        }
        let label = entries.aliases.get(name)?;
        entries.labels.get(label).cloned()
    }

    /// Whether the name is known as a label or alias. Alias targets are not checked.
    pub fn exists(&self, name: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.labels.contains_key(name) || e.aliases.contains_key(name))
            .unwrap_or(false)
    }

    /// All labels, sorted
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .entries
            .read()
            .map(|e| e.labels.keys().cloned().collect())
            .unwrap_or_default();
        labels.sort();
        labels
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.labels.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_checked_against_author() {
        let command = Command::new("ban").with_permission("ban_members");
        let moderator = User::new("1").with_permission("ban_members");
        let member = User::new("2");

        assert!(command.allows(Some(&moderator)));
        assert!(!command.allows(Some(&member)));
        assert!(!command.allows(None));
        assert!(Command::new("ping").allows(None));
    }

    #[test]
    fn test_alias_resolves_to_label() {
        let registry = CommandRegistry::new();
        registry
            .register(Command::new("ban").with_aliases(["b"]))
            .unwrap();

        let by_label = registry.resolve("ban").unwrap();
        let by_alias = registry.resolve("b").unwrap();
        assert!(Arc::ptr_eq(&by_label, &by_alias));
        assert_eq!(by_alias.label, "ban");
        assert!(!registry.exists("x"));
        assert!(registry.resolve("k").is_none());
    }

    #[test]
    fn test_every_alias_resolves_to_same_entry() {
        let registry = CommandRegistry::new();
        registry
            .register(Command::new("help").with_aliases(["h", "commands", "?"]))
            .unwrap();

        let label = registry.resolve("help").unwrap();
        for alias in ["h", "commands", "?"] {
            assert!(Arc::ptr_eq(&label, &registry.resolve(alias).unwrap()));
        }
    }

    #[test]
    fn test_conflicting_batch_leaves_registry_unchanged() {
        let registry = CommandRegistry::new();
        registry
            .register(Command::new("ban").with_aliases(["b"]))
            .unwrap();

        let err = registry
            .register(Command::new("block").with_aliases(["bl", "b"]))
            .unwrap_err();
        assert!(matches!(err, CommandError::Conflict { ref name, .. } if name == "b"));
        assert!(!registry.exists("block"));
        assert!(!registry.exists("bl"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_label_cannot_shadow_alias() {
        let registry = CommandRegistry::new();
        registry
            .register(Command::new("ban").with_aliases(["b"]))
            .unwrap();

        assert!(registry.register(Command::new("b")).is_err());
        assert!(registry.register(Command::new("ban")).is_err());
        assert!(registry
            .register(Command::new("kick").with_aliases(["kick"]))
            .is_err());
    }

    #[test]
    fn test_dangling_alias_exists_but_does_not_resolve() {
        let registry = CommandRegistry::new();
        registry.alias("m", "mute").unwrap();

        assert!(registry.exists("m"));
        assert!(registry.resolve("m").is_none());

        registry.register(Command::new("mute")).unwrap();
        assert_eq!(registry.resolve("m").unwrap().label, "mute");
    }

    #[test]
    fn test_labels_sorted() {
        let registry = CommandRegistry::new();
        registry.register(Command::new("ping")).unwrap();
        registry.register(Command::new("help")).unwrap();
        assert_eq!(registry.labels(), vec!["help", "ping"]);
        assert!(!registry.is_empty());
    }
}
