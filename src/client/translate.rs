//! Server messages to handler events.

use slircbot_proto::{Command, Message, Prefix, Response, is_channel_name};

use super::{EventKind, IrcEvent};

fn origin(prefix: Option<&Prefix>, strip_nicks: bool) -> Option<String> {
    prefix.map(|p| {
        if strip_nicks {
            p.name.clone()
        } else {
            p.to_string()
        }
    })
}

fn owned(params: &[&str]) -> Vec<String> {
    params.iter().map(|p| (*p).to_owned()).collect()
}

/// Events a server message surfaces as.
///
/// `PING` yields nothing; the connection answers it itself. `001` yields
/// [`EventKind::Connect`] followed by its numeric event.
pub fn translate(msg: &Message, strip_nicks: bool) -> Vec<IrcEvent> {
    let origin = origin(msg.prefix.as_ref(), strip_nicks);
    let params = owned(&msg.command.params());

    let kind = match &msg.command {
        Command::PING(..) => return Vec::new(),
        Command::PRIVMSG(target, _) if is_channel_name(target) => EventKind::Channel,
        Command::NOTICE(..) => EventKind::Notice,
        Command::KICK(..) => EventKind::Kick,
        Command::INVITE(..) => EventKind::Invite,
        Command::Response(resp, _) if *resp == Response::RPL_WELCOME => {
            return vec![
                IrcEvent::new(EventKind::Connect, origin.clone(), params.clone()),
                IrcEvent::new(EventKind::Numeric(resp.code()), origin, params),
            ];
        }
        Command::Response(resp, _) => EventKind::Numeric(resp.code()),
        other => EventKind::Unknown(other.name()),
    };

    vec![IrcEvent::new(kind, origin, params)]
}
