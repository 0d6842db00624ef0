use clap::Args;
use tomatick_core::format_remaining;
use tomatick_core::timer::plan;

#[derive(Args)]
pub struct PlanArgs {
    /// Number of sessions to show
    #[arg(long, short, default_value_t = 8)]
    count: usize,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sessions = plan(args.count);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    for session in sessions {
        println!(
            "{:>3}  {:<12} {:>5}",
            session.repetition,
            session.kind.label(),
            format_remaining(session.duration_secs)
        );
    }
    Ok(())
}
