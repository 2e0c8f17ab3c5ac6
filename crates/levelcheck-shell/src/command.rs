//! Command parsing and the alias table (§6 of the distilled spec, §4.7/§6b
//! of the expansion): one canonical [`Command`] per verb, reachable through
//! every short alias the original tool accepted.

use levelcheck_core::Stage;

use crate::error::{OperatorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FindSubcircuit(String),
    FindNet(String),
    Goto(String),
    CurrentHierarchy,
    PrintHierarchy,
    PrintDevice(String),
    PrintNet(String),
    ListNet(Option<String>),
    ListDevice(Option<String>),
    ListInstance(Option<String>),
    GetNet(String),
    GetDevice(String),
    GetInstance(String),
    ExpandNet(String),
    DumpFuse,
    DumpAnalogNets,
    DumpUnknownLogicalNets,
    TraceInverter(String),
    PrintCdl,
    PrintEnvironment,
    ToggleName,
    SetPower(String),
    SetModel(String),
    SetFuse(String),
    SearchLimit(Option<u32>),
    HierarchyDelimiter(Option<String>),
    PrintPower(String),
    PrintModel(String),
    Source(String),
    Debug(String, String),
    NoError,
    Skip,
    Rerun,
    Continue(Option<u32>),
    Help,
    Quit,
}

impl Command {
    /// The earliest [`Stage`] at which this command is accepted. Mirrors
    /// `CCvcDb_interactive.cc`'s `theCurrentStage != STAGE_START` guards on
    /// `setpower`/`setmodel`/`setfuse` and the later guards on the
    /// propagation-dependent dump/trace commands.
    pub fn minimum_stage(&self) -> Stage {
        match self {
            Command::SetPower(_) | Command::SetModel(_) | Command::SetFuse(_) => Stage::Start,
            Command::DumpAnalogNets | Command::DumpUnknownLogicalNets | Command::ExpandNet(_) => {
                Stage::FirstMinMax
            }
            Command::TraceInverter(_) => Stage::FirstSim,
            _ => Stage::Start,
        }
    }

    /// The canonical verb text used in diagnostics, regardless of which
    /// alias the operator actually typed.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::FindSubcircuit(_) => "findsubcircuit",
            Command::FindNet(_) => "findnet",
            Command::Goto(_) => "goto",
            Command::CurrentHierarchy => "currenthierarchy",
            Command::PrintHierarchy => "printhierarchy",
            Command::PrintDevice(_) => "printdevice",
            Command::PrintNet(_) => "printnet",
            Command::ListNet(_) => "listnet",
            Command::ListDevice(_) => "listdevice",
            Command::ListInstance(_) => "listinstance",
            Command::GetNet(_) => "getnet",
            Command::GetDevice(_) => "getdevice",
            Command::GetInstance(_) => "getinstance",
            Command::ExpandNet(_) => "expandnet",
            Command::DumpFuse => "dumpfuse",
            Command::DumpAnalogNets => "dumpanalognets",
            Command::DumpUnknownLogicalNets => "dumpunknownlogicalnets",
            Command::TraceInverter(_) => "traceinverter",
            Command::PrintCdl => "printcdl",
            Command::PrintEnvironment => "printenvironment",
            Command::ToggleName => "togglename",
            Command::SetPower(_) => "setpower",
            Command::SetModel(_) => "setmodel",
            Command::SetFuse(_) => "setfuse",
            Command::SearchLimit(_) => "searchlimit",
            Command::HierarchyDelimiter(_) => "hierarchydelimiter",
            Command::PrintPower(_) => "printpower",
            Command::PrintModel(_) => "printmodel",
            Command::Source(_) => "source",
            Command::Debug(_, _) => "debug",
            Command::NoError => "noerror",
            Command::Skip => "skip",
            Command::Rerun => "rerun",
            Command::Continue(_) => "continue",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

/// Parse one line of shell input into a [`Command`]. Blank lines and
/// `#`-comments parse to `None`, matching the other ambient file readers'
/// convention (not an error).
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let verb = tokens.next().expect("non-empty line has a first token");
    let rest: Vec<&str> = tokens.collect();

    let need_one = |cmd: &str| -> Result<String> {
        rest.first()
            .map(|s| s.to_string())
            .ok_or_else(|| OperatorError::MissingArgument { command: cmd.to_string() })
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "findsubcircuit" | "fs" => Command::FindSubcircuit(need_one("findsubcircuit")?),
        "findnet" | "fn" => Command::FindNet(need_one("findnet")?),
        "goto" | "g" | "cd" => Command::Goto(need_one("goto")?),
        "currenthierarchy" | "ch" | "pwd" => Command::CurrentHierarchy,
        "printhierarchy" | "ph" => Command::PrintHierarchy,
        "printdevice" | "pd" => Command::PrintDevice(need_one("printdevice")?),
        "printnet" | "pn" => Command::PrintNet(need_one("printnet")?),
        "listnet" | "ln" => Command::ListNet(rest.first().map(|s| s.to_string())),
        "listdevice" | "ld" => Command::ListDevice(rest.first().map(|s| s.to_string())),
        "listinstance" | "li" => Command::ListInstance(rest.first().map(|s| s.to_string())),
        "getnet" | "gn" => Command::GetNet(need_one("getnet")?),
        "getdevice" | "gd" => Command::GetDevice(need_one("getdevice")?),
        "getinstance" | "gi" => Command::GetInstance(need_one("getinstance")?),
        "expandnet" | "en" => Command::ExpandNet(need_one("expandnet")?),
        "dumpfuse" | "df" => Command::DumpFuse,
        "dumpanalognets" | "dan" => Command::DumpAnalogNets,
        "dumpunknownlogicalnets" | "duln" => Command::DumpUnknownLogicalNets,
        "traceinverter" | "ti" => Command::TraceInverter(need_one("traceinverter")?),
        "printcdl" | "pc" => Command::PrintCdl,
        "printenvironment" | "pe" => Command::PrintEnvironment,
        "togglename" | "n" => Command::ToggleName,
        "setpower" | "sp" => Command::SetPower(need_one("setpower")?),
        "setmodel" | "sm" => Command::SetModel(need_one("setmodel")?),
        "setfuse" | "sf" => Command::SetFuse(need_one("setfuse")?),
        "searchlimit" | "sl" => Command::SearchLimit(match rest.first() {
            Some(text) => Some(text.parse().map_err(|_| OperatorError::NotANumber(text.to_string()))?),
            None => None,
        }),
        "hierarchydelimiter" | "hd" => Command::HierarchyDelimiter(rest.first().map(|s| s.to_string())),
        "printpower" | "pp" => Command::PrintPower(need_one("printpower")?),
        "printmodel" | "pm" => Command::PrintModel(need_one("printmodel")?),
        "source" => Command::Source(need_one("source")?),
        "debug" => {
            let inst = need_one("debug")?;
            let cell = rest
                .get(1)
                .map(|s| s.to_string())
                .ok_or_else(|| OperatorError::MissingArgument { command: "debug".to_string() })?;
            Command::Debug(inst, cell)
        }
        "noerror" => Command::NoError,
        "skip" => Command::Skip,
        "rerun" => Command::Rerun,
        "continue" | "c" => Command::Continue(match rest.first() {
            Some(text) => Some(text.parse().map_err(|_| OperatorError::NotANumber(text.to_string()))?),
            None => None,
        }),
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(OperatorError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_the_same_command() {
        assert_eq!(parse("goto X1").unwrap(), parse("cd X1").unwrap());
        assert_eq!(parse("pwd").unwrap(), Some(Command::CurrentHierarchy));
    }

    #[test]
    fn blank_and_comment_lines_parse_to_none() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("# a note").unwrap(), None);
    }

    #[test]
    fn missing_argument_is_reported() {
        let err = parse("goto").unwrap_err();
        assert_eq!(err, OperatorError::MissingArgument { command: "goto".to_string() });
    }

    #[test]
    fn unknown_verb_is_reported() {
        let err = parse("frobnicate").unwrap_err();
        assert_eq!(err, OperatorError::UnknownCommand("frobnicate".to_string()));
    }

    #[test]
    fn searchlimit_without_argument_is_a_query() {
        assert_eq!(parse("searchlimit").unwrap(), Some(Command::SearchLimit(None)));
        assert_eq!(parse("sl 50").unwrap(), Some(Command::SearchLimit(Some(50))));
    }

    #[test]
    fn stage_gating_matches_distilled_table() {
        assert_eq!(Command::SetPower("x".into()).minimum_stage(), Stage::Start);
        assert_eq!(Command::TraceInverter("n".into()).minimum_stage(), Stage::FirstSim);
        assert_eq!(Command::DumpAnalogNets.minimum_stage(), Stage::FirstMinMax);
    }
}
