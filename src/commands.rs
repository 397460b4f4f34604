use crate::builder::{AutoSave, BuilderSession, EditGuard};
use crate::config::load_global_settings;
use crate::deeplink::{resolve_startup, EntryParams};
use crate::flow::FlowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliVerb {
    Flows,
    Show { id: String },
    Delete { id: String },
    Share { id: String },
    Clone { slug: String },
    Open { query: String },
    Quota,
    Help,
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "usage: flowsmith <command>".to_string(),
        "  flows              list saved flows".to_string(),
        "  show <id>          print one saved flow with its items".to_string(),
        "  delete <id>        delete a saved flow".to_string(),
        "  share <id>         mint a share link for a saved flow".to_string(),
        "  clone <slug>       clone a shared flow into the editor".to_string(),
        "  open <query>       resolve builder entry parameters (tab/load/from)".to_string(),
        "  quota              print the current tier and its limits".to_string(),
        "  help               show this help".to_string(),
    ]
}

pub fn parse_cli_verb(args: &[String]) -> Result<CliVerb, String> {
    let mut words = args.iter().map(String::as_str);
    let verb = match words.next() {
        None => return Ok(CliVerb::Help),
        Some(verb) => verb,
    };
    let mut require_value = |name: &str| {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| format!("`{verb} {name}` requires a value; run `flowsmith help`"))
    };
    match verb {
        "flows" => Ok(CliVerb::Flows),
        "show" => Ok(CliVerb::Show {
            id: require_value("<id>")?,
        }),
        "delete" => Ok(CliVerb::Delete {
            id: require_value("<id>")?,
        }),
        "share" => Ok(CliVerb::Share {
            id: require_value("<id>")?,
        }),
        "clone" => Ok(CliVerb::Clone {
            slug: require_value("<slug>")?,
        }),
        "open" => Ok(CliVerb::Open {
            query: require_value("<query>")?,
        }),
        "quota" => Ok(CliVerb::Quota),
        "help" | "--help" | "-h" => Ok(CliVerb::Help),
        other => Err(format!("unknown command `{other}`; run `flowsmith help`")),
    }
}

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let verb = parse_cli_verb(&args)?;
    if verb == CliVerb::Help {
        return Ok(cli_help_lines().join("\n"));
    }

    let settings = load_global_settings().map_err(|err| err.to_string())?;
    let mut session = BuilderSession::new(&settings);

    match verb {
        CliVerb::Help => Ok(cli_help_lines().join("\n")),
        CliVerb::Flows => cmd_flows(&mut session),
        CliVerb::Show { id } => cmd_show(&mut session, &id),
        CliVerb::Delete { id } => cmd_delete(&mut session, &id),
        CliVerb::Share { id } => cmd_share(&mut session, &id),
        CliVerb::Clone { slug } => cmd_clone(&mut session, &slug),
        CliVerb::Open { query } => cmd_open(&mut session, &query),
        CliVerb::Quota => cmd_quota(&session),
    }
}

fn parse_flow_id(raw: &str) -> Result<FlowId, String> {
    FlowId::parse(raw).map_err(|err| format!("invalid flow id `{raw}`: {err}"))
}

fn cmd_flows(session: &mut BuilderSession) -> Result<String, String> {
    session
        .refresh_saved_flows()
        .map_err(|err| err.to_string())?;
    let (used, cap) = session.quota_usage();
    let mut lines = vec![
        format!("flows={}", session.saved_flows().len()),
        format!("saved_quota={used}/{}", format_cap(cap)),
    ];
    for record in session.saved_flows() {
        lines.push(format!(
            "flow={} title={} items={}",
            record.id,
            record.title,
            record.items.len()
        ));
    }
    Ok(lines.join("\n"))
}

fn cmd_show(session: &mut BuilderSession, raw_id: &str) -> Result<String, String> {
    let id = parse_flow_id(raw_id)?;
    session
        .load_owned(&id, EditGuard::DiscardEdits)
        .map_err(|err| err.to_string())?;
    let flow = &session.state().flow;
    let mut lines = vec![
        format!("flow={raw_id}"),
        format!("title={}", flow.title),
        format!("style={}", flow.style),
        format!("level={}", flow.level),
        format!("target_minutes={}", flow.target_duration_minutes),
        format!("total_seconds={}", flow.total_duration_seconds()),
        format!("items={}", flow.items.len()),
    ];
    for (position, item) in flow.items.iter().enumerate() {
        lines.push(format!(
            "item={position} name={} duration={} side={}",
            item.source_item_name, item.duration_seconds, item.side
        ));
    }
    Ok(lines.join("\n"))
}

fn cmd_delete(session: &mut BuilderSession, raw_id: &str) -> Result<String, String> {
    let id = parse_flow_id(raw_id)?;
    session.delete(&id).map_err(|err| err.to_string())?;
    Ok(format!("deleted={raw_id}"))
}

fn cmd_share(session: &mut BuilderSession, raw_id: &str) -> Result<String, String> {
    let id = parse_flow_id(raw_id)?;
    session
        .load_owned(&id, EditGuard::DiscardEdits)
        .map_err(|err| err.to_string())?;
    let share = session.share().map_err(|err| err.to_string())?;
    let mut lines = vec![format!("share_slug={}", share.slug)];
    if let Some(url) = share.url {
        lines.push(format!("share_url={url}"));
    }
    Ok(lines.join("\n"))
}

fn cmd_clone(session: &mut BuilderSession, slug: &str) -> Result<String, String> {
    let outcome = session
        .clone_public(slug, EditGuard::DiscardEdits)
        .map_err(|err| err.to_string())?;
    let mut lines = vec![
        format!("clone_title={}", outcome.title),
        format!("items_loaded={}", outcome.items_loaded),
        format!("items_dropped={}", outcome.items_dropped),
    ];
    match outcome.auto_save {
        AutoSave::Saved { id } => {
            lines.push("auto_save=saved".to_string());
            lines.push(format!("flow_id={id}"));
        }
        AutoSave::Failed { reason } => {
            lines.push("auto_save=failed".to_string());
            lines.push(format!("auto_save_error={reason}"));
        }
        AutoSave::NotAttempted => lines.push("auto_save=not_attempted".to_string()),
    }
    Ok(lines.join("\n"))
}

fn cmd_open(session: &mut BuilderSession, query: &str) -> Result<String, String> {
    let mut params = EntryParams::parse_query(query);
    let mut lines = vec![format!("tab={}", params.tab().as_str())];
    match params.take_startup() {
        None => lines.push("startup=none".to_string()),
        Some(action) => {
            for notice in resolve_startup(session, action) {
                lines.push(format!("notice={}", notice.summary()));
            }
        }
    }
    Ok(lines.join("\n"))
}

fn cmd_quota(session: &BuilderSession) -> Result<String, String> {
    let quota = session.state().quota();
    Ok([
        format!("tier={}", session.state().tier),
        format!("can_save={}", quota.can_save),
        format!("max_items_per_flow={}", format_cap(quota.max_items_per_flow)),
        format!("max_saved_flows={}", format_cap(quota.max_saved_flows)),
    ]
    .join("\n"))
}

fn format_cap(cap: Option<usize>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "unlimited".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_args_show_help() {
        assert_eq!(parse_cli_verb(&[]).expect("verb"), CliVerb::Help);
    }

    #[test]
    fn verbs_with_values_require_them() {
        let err = parse_cli_verb(&["show".to_string()]).expect_err("missing id");
        assert!(err.contains("requires a value"));
        assert_eq!(
            parse_cli_verb(&["show".to_string(), "flow-1".to_string()]).expect("verb"),
            CliVerb::Show {
                id: "flow-1".to_string()
            }
        );
    }

    #[test]
    fn unknown_verb_points_at_help() {
        let err = parse_cli_verb(&["explode".to_string()]).expect_err("unknown");
        assert!(err.contains("unknown command"));
        assert!(err.contains("flowsmith help"));
    }
}
