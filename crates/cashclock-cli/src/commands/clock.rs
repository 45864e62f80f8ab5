use std::time::Duration;

use clap::Subcommand;
use cashclock_core::clock::{format_cost, format_elapsed, SystemClock};
use cashclock_core::{Calculator, Config, Database, Event, TokioTicker};

use super::load_calculator;

#[derive(Subcommand)]
pub enum ClockAction {
    /// Start a fresh clock
    Start,
    /// Stop a running clock
    Stop,
    /// Continue a stopped clock without resetting it
    Continue,
    /// Start, stop or continue depending on the current state
    Toggle,
    /// Back to zero
    Reset,
    /// Print current clock state as JSON
    Status,
    /// Change the rate
    Set {
        /// Number of persons in the meeting
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        persons: Option<u32>,
        /// Cost per person and hour
        #[arg(long)]
        cost_per_hour: Option<u32>,
    },
    /// Tick live and print the running reading
    Watch {
        /// Stop watching after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<u64>,
    },
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

fn print_outcome(event: Option<Event>, calc: &Calculator) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => print_event(&event),
        // Not valid in the current state: report where the clock stands.
        None => print_event(&calc.status()),
    }
}

pub fn run(action: ClockAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut calc = load_calculator(&db, &config.clock, Calculator::new());

    match action {
        ClockAction::Start => print_outcome(calc.start(), &calc)?,
        ClockAction::Stop => print_outcome(calc.stop(), &calc)?,
        ClockAction::Continue => print_outcome(calc.resume(), &calc)?,
        ClockAction::Toggle => print_outcome(calc.toggle(), &calc)?,
        ClockAction::Reset => print_event(&calc.reset())?,
        ClockAction::Status => {
            // Catch up on the time since the last command.
            calc.tick();
            print_event(&calc.status())?;
        }
        ClockAction::Set {
            persons,
            cost_per_hour,
        } => {
            if let Some(persons) = persons {
                calc.set_number_of_persons(persons)?;
            }
            if let Some(cost_per_hour) = cost_per_hour {
                calc.set_cost_per_hour(cost_per_hour);
            }
            print_event(&calc.status())?;
        }
        ClockAction::Watch { seconds } => {
            // Reloads with a live ticker and saves on exit.
            return watch(&db, config, seconds.map(Duration::from_secs));
        }
    }

    db.save_clock(&calc)?;
    Ok(())
}

fn watch(
    db: &Database,
    config: &Config,
    limit: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (ticker, mut ticks) = TokioTicker::channel();
        let calc = Calculator::with_runtime(Box::new(SystemClock), Box::new(ticker));
        let mut calc = load_calculator(db, &config.clock, calc);

        println!("{}", reading(calc.elapsed_secs(), calc.total_cost()));
        if !calc.is_running() {
            tracing::info!(state = %calc.state(), "clock is not running, nothing to watch");
            return Ok(());
        }

        // Print once per whole second; ticks come much faster.
        let mut last_printed = calc.elapsed_secs() as u64;
        calc.add_observer(Box::new(move |elapsed_secs: f64, total_cost: f64| {
            let whole = elapsed_secs as u64;
            if whole != last_printed {
                last_printed = whole;
                println!("{}", reading(elapsed_secs, total_cost));
            }
        }));

        let deadline = async {
            match limit {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                request = ticks.recv() => match request {
                    Some(_) => {
                        calc.tick();
                    }
                    None => break,
                },
                _ = &mut ctrl_c => break,
                _ = &mut deadline => break,
            }
        }

        calc.tick();
        db.save_clock(&calc)?;
        print_event(&calc.status())
    })
}

fn reading(elapsed_secs: f64, total_cost: f64) -> String {
    format!("{}  {}", format_elapsed(elapsed_secs), format_cost(total_cost))
}
