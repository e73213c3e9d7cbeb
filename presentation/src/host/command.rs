//! Line commands understood by the simulation host.
//!
//! Each line stands in for one chat event or bot command:
//!
//! ```text
//! propose @1 @2 marriage        react @2 msg:3 yes
//! dissolve @1 divorce           reply @4 I'm 21
//! submit @4 verification        upload @4 https://example.org/ref.png
//! withdraw @1                   interact @1 boop @2
//! grant @1 adult                level @1 12
//! dms @4 closed                 status
//! ```

use denkeeper_domain::{
    Capability, ExclusivityDomain, InteractionVerb, MessageId, ProposalKind, SubmissionKind,
    UserId,
};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Propose {
        initiator: UserId,
        counterparty: UserId,
        kind: ProposalKind,
    },
    Dissolve {
        initiator: UserId,
        kind: ProposalKind,
    },
    React {
        user: UserId,
        message: MessageId,
        emoji: String,
    },
    Reply {
        author: UserId,
        content: String,
    },
    Upload {
        author: UserId,
        url: String,
    },
    Submit {
        user: UserId,
        kind: SubmissionKind,
    },
    Withdraw {
        user: UserId,
        domain: ExclusivityDomain,
    },
    Interact {
        actor: UserId,
        verb: InteractionVerb,
        target: UserId,
    },
    Grant {
        user: UserId,
        capability: Capability,
    },
    Level {
        user: UserId,
        level: u32,
    },
    Dms {
        user: UserId,
        open: bool,
    },
    Status,
    Help,
    Quit,
}

impl HostCommand {
    pub const HELP: &'static str = "\
Commands:
  propose <user> <user> <marriage|collar>   Start a proposal
  dissolve <user> <divorce|escape>          End a relationship
  react <user> <message> <yes|no|emoji>     React to a message
  reply <user> <text...>                    Answer a DM question
  upload <user> <url>                       Reply with an attachment
  submit <user> <verification|profile|image>
  withdraw <user> [dissolution]             Withdraw a pending proposal
  interact <user> <verb> <user>             hug, boop, wag...
  grant <user> <adult|moderator|verified>   Give a capability role
  level <user> <level>                      Sync level-reward roles
  dms <user> <open|closed>                  Toggle a member's DMs
  status                                    Show pending work
  help | quit";
}

impl FromStr for HostCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err("Empty command".to_string());
        };
        let mut args = Args {
            command: head,
            words,
        };

        let command = match head.to_lowercase().as_str() {
            "propose" => {
                let initiator = args.parse("initiator")?;
                let counterparty = args.parse("counterparty")?;
                let kind = args.parse_or("kind", ProposalKind::Marriage)?;
                HostCommand::Propose {
                    initiator,
                    counterparty,
                    kind,
                }
            }
            "dissolve" => HostCommand::Dissolve {
                initiator: args.parse("user")?,
                kind: args.parse("kind")?,
            },
            "react" => HostCommand::React {
                user: args.parse("user")?,
                message: args.parse("message")?,
                emoji: args.emoji()?,
            },
            "reply" => HostCommand::Reply {
                author: args.parse("user")?,
                content: args.rest("text")?,
            },
            "upload" => HostCommand::Upload {
                author: args.parse("user")?,
                url: args.rest("url")?,
            },
            "submit" => HostCommand::Submit {
                user: args.parse("user")?,
                kind: args.parse("kind")?,
            },
            "withdraw" => {
                let user = args.parse("user")?;
                let domain = match args.words.next() {
                    None | Some("relationship") => ExclusivityDomain::Relationship,
                    Some("dissolution") => ExclusivityDomain::Dissolution,
                    Some(other) => return Err(format!("Unknown proposal domain: {}", other)),
                };
                HostCommand::Withdraw { user, domain }
            }
            "interact" => HostCommand::Interact {
                actor: args.parse("user")?,
                verb: args.parse("verb")?,
                target: args.parse("target")?,
            },
            "grant" => HostCommand::Grant {
                user: args.parse("user")?,
                capability: args.parse("capability")?,
            },
            "level" => HostCommand::Level {
                user: args.parse("user")?,
                level: args.parse("level")?,
            },
            "dms" => {
                let user = args.parse("user")?;
                let open = match args.words.next() {
                    Some("open") => true,
                    Some("closed") | Some("close") => false,
                    _ => return Err("Usage: dms <user> <open|closed>".to_string()),
                };
                HostCommand::Dms { user, open }
            }
            "status" => HostCommand::Status,
            "help" | "?" => HostCommand::Help,
            "quit" | "exit" | "q" => HostCommand::Quit,
            other => return Err(format!("Unknown command: {}", other)),
        };
        Ok(command)
    }
}

struct Args<'a, I> {
    command: &'a str,
    words: I,
}

impl<'a, I: Iterator<Item = &'a str>> Args<'a, I> {
    fn parse<T>(&mut self, name: &str) -> Result<T, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let word = self
            .words
            .next()
            .ok_or_else(|| format!("{}: missing <{}>", self.command, name))?;
        self.convert(name, word)
    }

    fn parse_or<T>(&mut self, name: &str, default: T) -> Result<T, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.words.next() {
            Some(word) => self.convert(name, word),
            None => Ok(default),
        }
    }

    fn convert<T>(&self, name: &str, word: &str) -> Result<T, String>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        word.parse()
            .map_err(|e| format!("{}: bad <{}>: {}", self.command, name, e))
    }

    /// An emoji, or a word standing in for one.
    fn emoji(&mut self) -> Result<String, String> {
        let word = self
            .words
            .next()
            .ok_or_else(|| format!("{}: missing <emoji>", self.command))?;
        Ok(match word.parse::<denkeeper_domain::ReactionSymbol>() {
            Ok(symbol) => symbol.emoji().to_string(),
            Err(_) => word.to_string(),
        })
    }

    fn rest(&mut self, name: &str) -> Result<String, String> {
        let rest: Vec<&str> = self.words.by_ref().collect();
        if rest.is_empty() {
            return Err(format!("{}: missing <{}>", self.command, name));
        }
        Ok(rest.join(" "))
    }
}
