//! Builtin commands

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::errors::CommandError;
use crate::application::services::CommandSetup;
use crate::domain::entities::{Command, CommandContext, CommandRegistry};
use crate::domain::traits::{Job, JobId, PlatformClient};
use crate::infrastructure::scheduler::JobRunner;

/// Name of jobs created by `remind`
pub const REMINDER_JOB: &str = "reminder";

const MAX_REMINDER_SECS: i64 = 7 * 24 * 60 * 60;

/// Registers help, ping and remind
pub struct BuiltinCommands;

impl CommandSetup for BuiltinCommands {
    fn setup(&self, registry: &CommandRegistry) -> Result<usize, CommandError> {
        let commands = vec![
            Command::new("help")
                .with_description("Show available commands")
                .with_usage("help [command]")
                .with_aliases(["h", "commands"])
                .with_handler(help),
            Command::new("ping")
                .with_description("Check that the bot is responding")
                .with_handler(|ctx| Ok(ctx.locale.text("commands.ping.reply").to_string())),
            Command::new("remind")
                .with_description("Remind you of something later")
                .with_usage("remind <seconds> <text> | remind cancel <id>")
                .with_aliases(["remindme"])
                .with_handler(remind),
        ];

        let count = commands.len();
        for command in commands {
            registry.register(command)?;
        }
        Ok(count)
    }
}

fn help(ctx: &CommandContext<'_>) -> Result<String, CommandError> {
    if let Some(name) = ctx.args.first() {
        let Some(command) = ctx.commands.resolve(&name.to_lowercase()) else {
            return Ok(ctx.locale.format("commands.help.unknown", &[("name", name.as_str())]));
        };
        let mut text = format!(
            "{}{} - {}",
            ctx.prefix,
            command.label,
            command.description.as_deref().unwrap_or_default()
        );
        if let Some(usage) = &command.usage {
            let label = ctx.locale.text("commands.help.usage");
            text.push_str(&format!("\n{} {}{}", label, ctx.prefix, usage));
        }
        if !command.aliases.is_empty() {
            let label = ctx.locale.text("commands.help.aliases");
            text.push_str(&format!("\n{} {}", label, command.aliases.join(", ")));
        }
        return Ok(text);
    }

    let mut text = ctx.locale.text("commands.help.header").to_string();
    for label in ctx.commands.labels() {
        if let Some(command) = ctx.commands.resolve(&label) {
            text.push_str(&format!(
                "\n  {}{} - {}",
                ctx.prefix,
                label,
                command.description.as_deref().unwrap_or_default()
            ));
        }
    }
    Ok(text)
}

/// What a reminder job carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub channel_id: String,
    pub text: String,
}

fn remind(ctx: &CommandContext<'_>) -> Result<String, CommandError> {
    let scheduler = ctx
        .scheduler
        .ok_or_else(|| CommandError::ExecutionFailed("no scheduler configured".to_string()))?;

    match ctx.args {
        [action, id] if action.as_str() == "cancel" => {
            let id = Uuid::parse_str(id)
                .map(JobId)
                .map_err(|_| CommandError::InvalidArgs(format!("not a reminder id: {}", id)))?;
            let key = if scheduler.cancel(&id) {
                "commands.remind.cancelled"
            } else {
                "commands.remind.not_found"
            };
            Ok(ctx.locale.text(key).to_string())
        }
        [seconds, text @ ..] if !text.is_empty() => {
            let seconds: i64 = seconds
                .parse()
                .ok()
                .filter(|s| (1..=MAX_REMINDER_SECS).contains(s))
                .ok_or_else(|| CommandError::InvalidArgs(format!("bad delay: {}", seconds)))?;

            let reminder = Reminder {
                channel_id: ctx.message.channel_id.clone(),
                text: text.join(" "),
            };
            let data = serde_json::to_value(&reminder)
                .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
            let job = Job::new(REMINDER_JOB, Utc::now() + chrono::Duration::seconds(seconds), data);
            let id = scheduler
                .schedule(job)
                .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

            let seconds = seconds.to_string();
            let id = id.to_string();
            Ok(ctx.locale.format(
                "commands.remind.scheduled",
                &[("seconds", seconds.as_str()), ("id", id.as_str())],
            ))
        }
        _ => Err(CommandError::InvalidArgs("usage: remind <seconds> <text>".to_string())),
    }
}

/// Delivers reminder jobs as chat messages
pub struct ReminderRunner {
    client: Arc<dyn PlatformClient>,
}

impl ReminderRunner {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRunner for ReminderRunner {
    async fn run(&self, job: Job) {
        if job.name != REMINDER_JOB {
            tracing::warn!("Unknown job type: {}", job.name);
            return;
        }
        let reminder: Reminder = match serde_json::from_value(job.data) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Malformed reminder: {}", e);
                return;
            }
        };
        if let Err(e) = self.client.send_message(&reminder.channel_id, &reminder.text).await {
            tracing::warn!("Failed to deliver reminder: {}", e);
        }
    }
}
