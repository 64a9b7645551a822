use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use times_drill::{config, profiling, DrillEngine, InMemoryLedger, Problem, SessionContext};

/// One line of learner input
#[derive(Debug, PartialEq)]
enum Command {
  Answer(u32),
  Skip,
  Tier(usize),
  Quit,
  Help,
}

fn parse_command(line: &str) -> Command {
  let line = line.trim();
  match line {
    "q" | "quit" => Command::Quit,
    "n" | "next" => Command::Skip,
    _ => {
      if let Some(rest) = line.strip_prefix('t') {
        // Tiers are shown 1-based
        return match rest.trim().parse::<usize>() {
          Ok(n) if n > 0 => Command::Tier(n - 1),
          _ => Command::Help,
        };
      }
      line.parse().map(Command::Answer).unwrap_or(Command::Help)
    }
  }
}

fn print_tiers(engine: &DrillEngine) {
  println!("Tiers:");
  for tier in engine.catalog().tiers() {
    println!("  t{}  {} ({} facts)", tier.index + 1, tier.title(), tier.facts.len());
  }
  println!("Type an answer, n for a new problem, t<number> to change tier, q to quit.");
}

fn print_problem(engine: &DrillEngine, ctx: &SessionContext, problem: &Problem) {
  let title = engine
    .get_tier(ctx.tier_index())
    .map(|t| t.title())
    .unwrap_or_default();
  let stats = ctx.stats();
  println!();
  println!("{}  |  {}  |  {}%", title, stats, stats.progress_percent());
  println!("  {}", problem.prompt());
  let choices: Vec<String> = problem.choices.iter().map(|c| format!("[{}]", c)).collect();
  println!("  {}", choices.join("  "));
}

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "times_drill=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  // Initialize profiling (no-op if feature disabled)
  profiling::init();

  let settings = config::load_settings();
  let engine = DrillEngine::from_settings(settings).expect("Failed to load tier catalog");
  let learner = std::env::args().nth(1).unwrap_or_else(|| "learner".to_string());

  let mut ledger = InMemoryLedger::new();
  let mut ctx = engine
    .start_session(learner.as_str(), 0)
    .expect("Failed to start session");

  print_tiers(&engine);
  if let Some(problem) = ctx.problem() {
    print_problem(&engine, &ctx, problem);
  }

  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    tokio::select! {
      line = lines.next_line() => {
        let Ok(Some(line)) = line else { break };
        match parse_command(&line) {
          Command::Quit => break,
          Command::Help => print_tiers(&engine),
          Command::Skip => match engine.skip_problem(&mut ctx) {
            Ok(problem) => {
              let problem = problem.clone();
              print_problem(&engine, &ctx, &problem);
            }
            Err(e) => println!("Could not load a problem: {}", e),
          },
          Command::Tier(index) => match engine.switch_tier(&mut ctx, index) {
            Ok(problem) => {
              let problem = problem.clone();
              print_problem(&engine, &ctx, &problem);
            }
            Err(e) => println!("{}", e),
          },
          Command::Answer(choice) => match engine.submit_answer(&mut ctx, choice, &mut ledger) {
            Ok(outcome) => {
              println!("  {}", outcome.message());
              if let Some(index) = outcome.advanced_to {
                if let Ok(tier) = engine.get_tier(index) {
                  println!("  Level up! Next: {}", tier.title());
                }
              }
              if let Err(e) = engine.schedule_advance(&mut ctx, tx.clone()) {
                tracing::warn!("Feedback timer unavailable: {}", e);
              }
            }
            Err(e) => println!("  {}", e),
          },
        }
      }
      Some(ticket) = rx.recv() => {
        match engine.complete_advance(&mut ctx, ticket) {
          Ok(Some(problem)) => {
            let problem = problem.clone();
            print_problem(&engine, &ctx, &problem);
          }
          Ok(None) => {}
          Err(e) => println!("Could not load a problem: {}", e),
        }
      }
    }
  }

  println!();
  println!("{}", ctx.stats());
  let weakest: Vec<String> = ledger
    .records_for(ctx.learner_id())
    .into_iter()
    .filter(|(_, record)| record.success_rate() < 1.0)
    .take(3)
    .map(|(token, record)| format!("{} ({}/{})", token, record.correct, record.attempts))
    .collect();
  if !weakest.is_empty() {
    println!("Keep practicing: {}", weakest.join(", "));
  }

  profiling::shutdown();
}
