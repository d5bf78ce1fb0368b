//! Best-effort lookup of the process behind an access.
//!
//! Lookups never fail loudly: a field that cannot be read degrades to
//! [`UNKNOWN`](crate::event::UNKNOWN), and a resolver that cannot say
//! anything returns `None`.

use crate::event::{Actor, UNKNOWN};

/// Source of actor information for events recorded without one.
pub trait ActorResolver: Send + Sync {
    /// Describe the acting process, if anything is known.
    fn resolve(&self) -> Option<Actor>;
}

/// Describes the current process.
///
/// Filesystem notifications do not carry the originating pid, so this is the
/// closest local signal available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessActorResolver;

impl ActorResolver for ProcessActorResolver {
    fn resolve(&self) -> Option<Actor> {
        Some(Actor {
            process_name: process_name().unwrap_or_else(|| UNKNOWN.to_owned()),
            process_id: Some(std::process::id()),
            username: username().unwrap_or_else(|| UNKNOWN.to_owned()),
            command_line: command_line().unwrap_or_else(|| UNKNOWN.to_owned()),
        })
    }
}

/// Resolver that knows nothing. Every event gets [`Actor::unknown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActorResolver;

impl ActorResolver for NoActorResolver {
    fn resolve(&self) -> Option<Actor> {
        None
    }
}

fn process_name() -> Option<String> {
    if let Ok(comm) = std::fs::read_to_string("/proc/self/comm") {
        let trimmed = comm.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_owned());
        }
    }
    std::env::current_exe()
        .ok()?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

fn command_line() -> Option<String> {
    if let Ok(raw) = std::fs::read("/proc/self/cmdline") {
        let parts: Vec<String> = raw
            .split(|b| *b == 0)
            .filter(|part| !part.is_empty())
            .map(|part| String::from_utf8_lossy(part).into_owned())
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(" "));
        }
    }
    let args: Vec<String> = std::env::args().collect();
    (!args.is_empty()).then(|| args.join(" "))
}

#[cfg(unix)]
fn username() -> Option<String> {
    match nix::unistd::User::from_uid(nix::unistd::getuid()) {
        Ok(Some(user)) => Some(user.name),
        Ok(None) | Err(_) => std::env::var("USER").ok(),
    }
}

#[cfg(not(unix))]
fn username() -> Option<String> {
    std::env::var("USERNAME").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_resolver_reports_current_pid() {
        let actor = ProcessActorResolver.resolve().unwrap();
        assert_eq!(actor.process_id, Some(std::process::id()));
        assert!(!actor.process_name.is_empty());
        assert!(!actor.command_line.is_empty());
    }

    #[test]
    fn test_no_resolver_yields_none() {
        assert!(NoActorResolver.resolve().is_none());
    }
}
