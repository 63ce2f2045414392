//! Study Planner 命令行入口
//!
//! 初始化日志与配置、构建 Tutor，然后在 stdin 上运行一个按行交互的会话。
//! 启动失败（缺 Key、分类器产物不一致）直接以非零码退出。

use anyhow::Context;
use study_planner::classifier::LearnerSignals;
use study_planner::core::create_tutor;
use study_planner::plan::{Depth, DifficultySource, Plan, PlanRequest, ResourceKind, Style};
use study_planner::session::SessionState;
use study_planner::Tutor;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /new <topic> [| level]               new plan (level defaults to Beginner)
  /infer <score> <time> <attempts> <topic>
                                       new plan, level inferred from quiz signals
  /style <visual|text|hands-on|academic>
  /depth <overview|core|deep>
  /kinds <video,books,articles,interactive>
  /history  /open <n>  /clear-history
  /guide  /resources  /search  /quiz
  /quit
Anything else is sent to the tutor as a follow-up question.";

/// 生成新计划时使用的偏好（跨计划保留）
struct Preferences {
    style: Style,
    depth: Depth,
    kinds: Vec<ResourceKind>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            style: Style::default(),
            depth: Depth::default(),
            kinds: ResourceKind::defaults(),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    New { topic: String, level: String },
    Infer { signals: LearnerSignals, topic: String },
    Style(String),
    Depth(String),
    Kinds(String),
    History,
    Open(usize),
    ClearHistory,
    Guide,
    Resources,
    Search,
    Quiz,
    Help,
    Quit,
    Chat(String),
    Invalid(&'static str),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Chat(line.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "new" => {
            let (topic, level) = match arg.split_once('|') {
                Some((topic, level)) if !level.trim().is_empty() => (topic.trim(), level.trim()),
                Some((topic, _)) => (topic.trim(), "Beginner"),
                None => (arg, "Beginner"),
            };
            Command::New {
                topic: topic.to_string(),
                level: level.to_string(),
            }
        }
        "infer" => {
            let mut parts = arg.splitn(4, char::is_whitespace);
            let score = parts.next().and_then(|s| s.parse::<f64>().ok());
            let time = parts.next().and_then(|s| s.parse::<f64>().ok());
            let attempts = parts.next().and_then(|s| s.parse::<u32>().ok());
            let topic = parts.next().map(str::trim).unwrap_or_default();
            match (score, time, attempts) {
                (Some(score), Some(time), Some(attempts)) => Command::Infer {
                    signals: LearnerSignals::new(score, time, attempts),
                    topic: topic.to_string(),
                },
                _ => Command::Invalid("usage: /infer <score> <time> <attempts> <topic>"),
            }
        }
        "style" => Command::Style(arg.to_string()),
        "depth" => Command::Depth(arg.to_string()),
        "kinds" => Command::Kinds(arg.to_string()),
        "history" => Command::History,
        "open" => match arg.parse::<usize>() {
            Ok(n) => Command::Open(n),
            Err(_) => Command::Invalid("usage: /open <n> (see /history)"),
        },
        "clear-history" => Command::ClearHistory,
        "guide" => Command::Guide,
        "resources" => Command::Resources,
        "search" => Command::Search,
        "quiz" => Command::Quiz,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Invalid("unknown command, try /help"),
    }
}

fn print_plan(plan: &Plan) {
    println!("== {} ({}) ==", plan.topic(), plan.level());
    if let Some(image) = plan.image() {
        println!("[image] {}", image);
    }
    println!("{}", plan.text());
    println!("({} resources, /resources to list)", plan.resources().len());
}

fn print_resources(plan: &Plan) {
    if plan.resources().is_empty() {
        println!("No resources.");
        return;
    }
    for (i, r) in plan.resources().iter().enumerate() {
        println!("{}. [{}] {}", i + 1, r.type_label(), r.title);
        println!("   {}", r.description);
        if r.has_link() {
            println!("   {}", r.link);
        }
    }
}

async fn handle(
    tutor: &Tutor,
    state: &mut SessionState,
    prefs: &mut Preferences,
    command: Command,
) -> bool {
    match command {
        Command::New { topic, level } => {
            let request = PlanRequest::new(topic, DifficultySource::UserSelected(level));
            new_plan(tutor, state, prefs, request).await;
        }
        Command::Infer { signals, topic } => {
            let request = PlanRequest::new(topic, DifficultySource::Inferred(signals));
            new_plan(tutor, state, prefs, request).await;
        }
        Command::Style(s) => match s.parse::<Style>() {
            Ok(style) => prefs.style = style,
            Err(e) => println!("{}", e),
        },
        Command::Depth(s) => match s.parse::<Depth>() {
            Ok(depth) => prefs.depth = depth,
            Err(e) => println!("{}", e),
        },
        Command::Kinds(s) => {
            let parsed: Result<Vec<ResourceKind>, _> = s
                .split(',')
                .filter(|k| !k.trim().is_empty())
                .map(|k| k.parse::<ResourceKind>())
                .collect();
            match parsed {
                Ok(kinds) => prefs.kinds = kinds,
                Err(e) => println!("{}", e),
            }
        }
        Command::History => {
            let entries = state.history_entries();
            if entries.is_empty() {
                println!("No history yet.");
            }
            for entry in entries {
                println!("{}: {}", entry.index, entry.label);
            }
        }
        Command::Open(index) => match tutor.select_history(state, index) {
            Some(plan) => print_plan(&plan),
            None => println!("No history entry {}.", index),
        },
        Command::ClearHistory => tutor.clear_history(state),
        Command::Guide => match state.current_plan() {
            Some(plan) => print_plan(plan),
            None => println!("No plan yet, try /new <topic>."),
        },
        Command::Resources => match state.current_plan() {
            Some(plan) => print_resources(plan),
            None => println!("No plan yet, try /new <topic>."),
        },
        Command::Search => match state.current_plan() {
            Some(plan) => println!("{}", plan.raw_search()),
            None => println!("No plan yet, try /new <topic>."),
        },
        Command::Quiz => match tutor.quiz(state).await {
            Ok(Some(quiz)) => println!("{}", quiz),
            Ok(None) => println!("No plan yet, try /new <topic>."),
            Err(e) => println!("{}", e),
        },
        Command::Chat(text) => match tutor.chat(state, &text).await {
            Ok(Some(answer)) => println!("{}", answer),
            Ok(None) if state.current_plan().is_none() => {
                println!("Generate a plan first with /new <topic>.")
            }
            Ok(None) => {}
            Err(e) => println!("{}", e),
        },
        Command::Help => println!("{}", HELP),
        Command::Invalid(msg) => println!("{}", msg),
        Command::Quit => return false,
    }
    true
}

async fn new_plan(tutor: &Tutor, state: &mut SessionState, prefs: &Preferences, request: PlanRequest) {
    let request = request
        .with_style(prefs.style)
        .with_depth(prefs.depth)
        .with_resource_kinds(prefs.kinds.clone());
    match tutor.new_plan(state, request).await {
        Some(plan) => print_plan(&plan),
        None => println!("Please enter a topic."),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    study_planner::observability::init();

    let config_path = std::env::args().nth(1).map(Into::into);
    let (tutor, config) = create_tutor(config_path).context("Startup failed")?;
    tracing::info!(app = ?config.app.name, "study planner ready");

    let mut state = SessionState::new();
    let mut prefs = Preferences::default();
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        if !handle(&tutor, &mut state, &mut prefs, parse_command(&line)).await {
            break;
        }
    }
    Ok(())
}
