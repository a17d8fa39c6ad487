use crate::commands::Command;
use crate::errors::command_error::CommandError;
use crate::report::{AccountSnapshot, ChangeReport, ContactSnapshot};
use contactsd_telepathy::{Account, ContactSource, InfoField, MemoryAccount, MemoryContact};
use log::{error, info};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Applies stdin commands to in-memory sources and collects the reports the
/// tracked contacts produce.
pub struct Daemon {
    account: Account,
    account_source: Rc<MemoryAccount>,
    sources: HashMap<String, Rc<MemoryContact>>,
    report_tx: mpsc::UnboundedSender<ChangeReport>,
}

impl Daemon {
    pub fn new(
        account: Account,
        account_source: Rc<MemoryAccount>,
        report_tx: mpsc::UnboundedSender<ChangeReport>,
    ) -> Self {
        Daemon {
            account,
            account_source,
            sources: HashMap::new(),
            report_tx,
        }
    }

    /// Runs `command`, returning the lines to print right away.
    pub fn execute(&mut self, command: Command) -> Result<Vec<String>, CommandError> {
        match command {
            Command::Add(id) => {
                let source = Rc::new(MemoryContact::new(&id));
                let contact = self.account.add_contact(source.clone())?;

                let report_tx = self.report_tx.clone();
                contact.connect_changed(move |contact, changes| {
                    if let Err(error) = report_tx.send(ChangeReport::new(contact, changes)) {
                        error!("Could not queue report for {}: {error}", contact.id());
                    }
                });

                self.sources.insert(id.clone(), source);
                info!("Added {id}");
            }

            Command::Alias { id, alias } => self.source(&id)?.set_alias(&alias),

            Command::Presence {
                id,
                status,
                message,
            } => self.source(&id)?.set_presence(&status, &message),

            Command::Capabilities { id, capabilities } => {
                self.source(&id)?.set_capabilities(capabilities)
            }

            Command::Avatar {
                id,
                token,
                file_name,
            } => self.source(&id)?.set_avatar(&token, file_name.as_deref()),

            Command::Subscription { id, state } => self.source(&id)?.set_subscription_state(state),

            Command::Publish { id, state, message } => {
                self.source(&id)?.set_publish_state(state, &message)
            }

            Command::Info { id, name, value } => {
                let source = self.source(&id)?;
                let mut fields = source.info_fields();
                fields.retain(|field| *field.name != name);
                fields.push(InfoField {
                    name: Arc::new(name),
                    parameters: vec![],
                    values: vec![Arc::new(value)],
                });

                source.set_info_fields(fields);
            }

            Command::Block { id, blocked } => self.source(&id)?.set_blocked(blocked),

            Command::Remove(id) => {
                let contact = self.account.remove_contact(&id)?;
                self.sources.remove(&id);
                info!("Removed {id}, visible: {}", contact.is_visible());
            }

            Command::Nickname(nickname) => self.account_source.set_nickname(&nickname),

            Command::Account => {
                return Ok(vec![serde_json::to_string(&AccountSnapshot::new(
                    &self.account,
                ))?]);
            }

            Command::List => {
                return self
                    .account
                    .contacts()
                    .iter()
                    .map(|contact| {
                        serde_json::to_string(&ContactSnapshot::new(contact))
                            .map_err(CommandError::from)
                    })
                    .collect();
            }
        }

        Ok(vec![])
    }

    fn source(&self, id: &str) -> Result<Rc<MemoryContact>, CommandError> {
        self.sources
            .get(id)
            .cloned()
            .ok_or_else(|| CommandError::UnknownContact(id.to_string()))
    }
}
