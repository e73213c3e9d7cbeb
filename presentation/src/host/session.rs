//! Simulation host: the dispatch loop standing in for the chat gateway.
//!
//! Lines from the input become commands and events. Proposals, dissolutions,
//! submissions and reviews run as supervised workflows so the loop keeps
//! reading while they wait on their gates.

use super::command::HostCommand;
use crate::console::{ConsoleNotifier, ConsoleRenderer};
use colored::Colorize;
use denkeeper_application::{Authorizer, WorkflowCoordinator, WorkflowError};
use denkeeper_domain::{ReactionEvent, ReplyEvent};
use std::fmt::Display;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct SimulationHost {
    coordinator: Arc<WorkflowCoordinator>,
    notifier: Arc<ConsoleNotifier>,
    authorizer: Arc<dyn Authorizer>,
    tasks: Mutex<Vec<JoinHandle<Option<()>>>>,
}

impl SimulationHost {
    pub fn new(
        coordinator: Arc<WorkflowCoordinator>,
        notifier: Arc<ConsoleNotifier>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            coordinator,
            notifier,
            authorizer,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Read commands until end of input or `quit`, then wind down.
    pub async fn run<R>(&self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.parse::<HostCommand>() {
                Ok(command) => {
                    if self.execute(command).await == Flow::Quit {
                        break;
                    }
                }
                Err(e) => eprintln!("{}", e.yellow()),
            }
        }
        self.finish().await;
        Ok(())
    }

    /// Apply one command.
    pub async fn execute(&self, command: HostCommand) -> Flow {
        let general = self.coordinator.config().channels().general;

        match command {
            HostCommand::Propose {
                initiator,
                counterparty,
                kind,
            } => {
                let this = Arc::clone(&self.coordinator);
                let workflow = async move { this.propose(initiator, counterparty, kind, general).await };
                self.spawn(
                    format!("{} {} -> {}", kind, initiator, counterparty),
                    workflow,
                    ConsoleRenderer::workflow_outcome,
                );
            }
            HostCommand::Dissolve { initiator, kind } => {
                let this = Arc::clone(&self.coordinator);
                let workflow = async move { this.dissolve(initiator, kind, general).await };
                self.spawn(
                    format!("{} {}", kind, initiator),
                    workflow,
                    ConsoleRenderer::workflow_outcome,
                );
            }
            HostCommand::Submit { user, kind } => {
                let this = Arc::clone(&self.coordinator);
                let workflow = async move { this.begin_submission(user, kind).await };
                self.spawn(
                    format!("{} {}", kind, user),
                    workflow,
                    ConsoleRenderer::intake_outcome,
                );
            }
            HostCommand::React {
                user,
                message,
                emoji,
            } => {
                let this = Arc::clone(&self.coordinator);
                let event = ReactionEvent {
                    message,
                    user,
                    emoji,
                };
                let workflow =
                    async move { Ok::<_, WorkflowError>(this.handle_reaction(event).await) };
                self.spawn(format!("reaction on {}", message), workflow, |outcome| {
                    match outcome {
                        Some(outcome) => ConsoleRenderer::review_outcome(outcome),
                        None => "handled".dimmed().to_string(),
                    }
                });
            }
            HostCommand::Reply { author, content } => {
                self.reply(ReplyEvent::text(author, content));
            }
            HostCommand::Upload { author, url } => {
                self.reply(ReplyEvent::text(author, "").with_attachment(url));
            }
            HostCommand::Withdraw { user, domain } => match self.coordinator.withdraw(user, domain) {
                Ok(proposal) => println!("withdrew {} {}", proposal.kind, proposal.id),
                Err(e) => println!("{}", ConsoleRenderer::error(&e)),
            },
            HostCommand::Interact { actor, verb, target } => {
                if let Err(e) = self.coordinator.interact(actor, target, verb, general).await {
                    println!("{}", ConsoleRenderer::error(&e));
                }
            }
            HostCommand::Grant { user, capability } => {
                match self.authorizer.grant_capability(user, capability).await {
                    Ok(()) => println!("{} is now {}", user, capability),
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            HostCommand::Level { user, level } => {
                match self.coordinator.sync_level_roles(user, level).await {
                    Ok(diff) if diff.is_empty() => println!("{} already has the right roles", user),
                    Ok(diff) => println!(
                        "{}: +{} / -{} roles",
                        user,
                        diff.grant.len(),
                        diff.revoke.len()
                    ),
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            HostCommand::Dms { user, open } => {
                self.notifier.set_dms_open(user, open);
                println!("{} DMs {}", user, if open { "open" } else { "closed" });
            }
            HostCommand::Status => self.print_status(),
            HostCommand::Help => println!("{}", HostCommand::HELP),
            HostCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Shut the coordinator down and wait for every workflow to end.
    pub async fn finish(&self) {
        self.coordinator.shutdown();
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
        info!("Waiting for {} workflow(s) to finish", tasks.len());
        for task in tasks {
            if let Err(e) = task.await {
                warn!("Workflow supervisor ended abnormally: {}", e);
            }
        }
    }

    fn reply(&self, reply: ReplyEvent) {
        let author = reply.author;
        if !self.coordinator.handle_reply(reply) {
            println!("{}", format!("(nobody is waiting on {})", author).dimmed());
        }
    }

    /// Run a workflow under supervision and print how it ended.
    fn spawn<F, T>(&self, label: String, workflow: F, render: fn(&T) -> String)
    where
        F: Future<Output = Result<T, WorkflowError>> + Send + 'static,
        T: Send + 'static,
    {
        debug!("Starting workflow '{}'", label);
        let name = label.clone();
        let handle = WorkflowCoordinator::spawn_workflow(label, async move {
            match workflow.await {
                Ok(outcome) => report(&name, render(&outcome)),
                Err(e) => report(&name, ConsoleRenderer::error(&e)),
            }
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    fn print_status(&self) {
        let coordinator = &self.coordinator;
        let running = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|task| !task.is_finished())
            .count();
        println!("{}", "Status".cyan().bold());
        println!("  workflows running:   {}", running);
        println!("  pending proposals:   {}", coordinator.proposals().len());
        println!("  pending submissions: {}", coordinator.submissions().len());
        println!("  open reaction gates: {}", coordinator.reaction_gate().open_gates());
        println!("  active cooldowns:    {}", coordinator.cooldowns().len());
        println!("  live messages:       {}", self.notifier.live_messages().len());
    }
}

fn report(label: &str, result: impl Display) {
    println!("{} {}", format!("{}:", label).bold(), result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use denkeeper_application::{
        AuthorizationError, PersistenceError, RelationshipStore, SubmissionStore, WorkflowConfig,
    };
    use denkeeper_domain::{
        Capability, MessageId, Relationship, RelationshipId, RelationshipKind,
        RoleId, Submission, SubmissionKind, UserId,
    };
    use std::collections::{BTreeSet, HashSet};
    use std::time::Duration;

    #[derive(Default)]
    struct Relationships(Mutex<Vec<Relationship>>);

    #[async_trait]
    impl RelationshipStore for Relationships {
        async fn create_relationship(
            &self,
            kind: RelationshipKind,
            party_a: UserId,
            party_b: UserId,
        ) -> Result<Relationship, PersistenceError> {
            let mut rows = self.0.lock().unwrap();
            let rel = Relationship {
                id: RelationshipId(rows.len() as u64 + 1),
                kind,
                party_a,
                party_b,
                formed_at: chrono::Utc::now(),
            };
            rows.push(rel.clone());
            Ok(rel)
        }

        async fn delete_relationship(&self, id: RelationshipId) -> Result<(), PersistenceError> {
            self.0.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }

        async fn relationships_of(&self, user: UserId) -> Result<Vec<Relationship>, PersistenceError> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.involves(user))
                .cloned()
                .collect())
        }
    }

    struct NoRecords;

    #[async_trait]
    impl SubmissionStore for NoRecords {
        async fn create_submission_record(&self, _: &Submission) -> Result<(), PersistenceError> {
            Ok(())
        }

        async fn has_record(&self, _: UserId, _: SubmissionKind) -> Result<bool, PersistenceError> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct Capabilities(Mutex<HashSet<(UserId, Capability)>>);

    #[async_trait]
    impl Authorizer for Capabilities {
        fn has_capability(&self, subject: UserId, capability: Capability) -> bool {
            self.0.lock().unwrap().contains(&(subject, capability))
        }

        async fn grant_capability(
            &self,
            subject: UserId,
            capability: Capability,
        ) -> Result<(), AuthorizationError> {
            self.0.lock().unwrap().insert((subject, capability));
            Ok(())
        }

        async fn roles_of(&self, _: UserId) -> Result<BTreeSet<RoleId>, AuthorizationError> {
            Ok(BTreeSet::new())
        }

        async fn add_role(&self, _: UserId, _: RoleId) -> Result<(), AuthorizationError> {
            Ok(())
        }

        async fn remove_role(&self, _: UserId, _: RoleId) -> Result<(), AuthorizationError> {
            Ok(())
        }
    }

    fn host() -> (SimulationHost, Arc<Relationships>) {
        let relationships = Arc::new(Relationships::default());
        let notifier = Arc::new(ConsoleNotifier::silent());
        let authorizer: Arc<dyn Authorizer> = Arc::new(Capabilities::default());
        let coordinator = Arc::new(WorkflowCoordinator::new(
            WorkflowConfig::default(),
            relationships.clone(),
            Arc::new(NoRecords),
            notifier.clone(),
            authorizer.clone(),
        ));
        (SimulationHost::new(coordinator, notifier, authorizer), relationships)
    }

    async fn until(mut condition: impl FnMut() -> bool) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("condition never held");
    }

    #[tokio::test]
    async fn test_collar_accepted_through_commands() {
        let (host, relationships) = host();
        for line in ["grant @1 adult", "grant @2 adult", "propose @1 @2 collar"] {
            assert_eq!(host.execute(line.parse().unwrap()).await, Flow::Continue);
        }

        until(|| host.coordinator.reaction_gate().open_gates() == 1).await;
        // The prompt is the first message the notifier posted.
        host.execute(HostCommand::React {
            user: UserId(2),
            message: MessageId(1),
            emoji: "✅".to_string(),
        })
        .await;

        until(|| relationships.0.lock().unwrap().len() == 1).await;
        host.finish().await;

        let rel = relationships.0.lock().unwrap()[0].clone();
        assert_eq!(rel.kind, RelationshipKind::Collar);
        assert_eq!(rel.owner(), Some(UserId(1)));
        assert!(host.coordinator.proposals().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_at_quit_and_cancels_waits() {
        let (host, relationships) = host();
        let script = "\
# comment lines are skipped
grant @1 adult
grant @2 adult
propose @1 @2 marriage
not-a-command
quit
propose @3 @4
";
        let input = tokio::io::BufReader::new(script.as_bytes());

        host.run(input).await.unwrap();

        // The pending marriage was superseded by shutdown; nothing after quit ran.
        assert!(host.coordinator.proposals().is_empty());
        assert_eq!(host.coordinator.reaction_gate().open_gates(), 0);
        assert!(relationships.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_survives_aborted_tasks() {
        let (host, _) = host();
        let stuck = tokio::spawn(async {
            std::future::pending::<()>().await;
            Some(())
        });
        stuck.abort();
        host.tasks.lock().unwrap().push(stuck);
        host.tasks.lock().unwrap().push(tokio::spawn(async { Some(()) }));

        host.finish().await;
        assert!(host.tasks.lock().unwrap().is_empty());
    }
}
