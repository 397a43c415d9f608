use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fixq_math::{Fp, OverflowPolicy};
use log::LevelFilter;
use simple_logger::SimpleLogger;

const PRI_MIN: i32 = 0;
const PRI_MAX: i32 = 63;
const NICE_MIN: i32 = -20;
const NICE_MAX: i32 = 20;

/// Simulate the multilevel-feedback scheduler bookkeeping of a single busy
/// thread using 17.14 fixed-point arithmetic only.
///
/// Every second:
///   load_avg   = 59/60 * load_avg + 1/60 * ready
///   recent_cpu = (2 * load_avg) / (2 * load_avg + 1) * recent_cpu + nice
///   priority   = PRI_MAX - recent_cpu / 4 - 2 * nice
/// and recent_cpu grows by one on every timer tick the thread runs.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Args {
    /// Simulated seconds
    #[arg(long, default_value_t = 30)]
    seconds: u32,

    /// Threads ready to run (including the running one)
    #[arg(long, default_value_t = 1)]
    ready: i32,

    /// Niceness of the running thread (-20..=20)
    #[arg(
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(i64::from(NICE_MIN)..=i64::from(NICE_MAX))
    )]
    nice: i32,

    /// Timer ticks per second charged to the running thread
    #[arg(long, default_value_t = 100)]
    ticks_per_second: i32,

    /// Overflow behaviour for every fixed-point operation
    #[arg(long, value_enum, default_value_t = Policy::Checked)]
    policy: Policy,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Policy {
    Checked,
    Saturating,
    Wrapping,
}

impl From<Policy> for OverflowPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Checked => OverflowPolicy::Checked,
            Policy::Saturating => OverflowPolicy::Saturating,
            Policy::Wrapping => OverflowPolicy::Wrapping,
        }
    }
}

struct Scheduler {
    policy: OverflowPolicy,
    decay: Fp,
    gain: Fp,
    load_avg: Fp,
    recent_cpu: Fp,
    nice: i32,
}

impl Scheduler {
    fn new(policy: OverflowPolicy, nice: i32) -> Result<Self> {
        Ok(Self {
            policy,
            decay: Fp::from_ratio(59, 60)?,
            gain: Fp::from_ratio(1, 60)?,
            load_avg: Fp::ZERO,
            recent_cpu: Fp::ZERO,
            nice,
        })
    }

    fn tick(&mut self) -> Result<()> {
        self.recent_cpu = self.policy.add_int(self.recent_cpu, 1)?;
        Ok(())
    }

    fn update_load_avg(&mut self, ready: i32) -> Result<()> {
        let p = self.policy;
        let decayed = p.mul(self.decay, self.load_avg)?;
        let fresh = p.mul_int(self.gain, ready)?;
        self.load_avg = p.add(decayed, fresh)?;
        Ok(())
    }

    fn update_recent_cpu(&mut self) -> Result<()> {
        let p = self.policy;
        let twice_load = p.mul_int(self.load_avg, 2)?;
        let coefficient = p.div(twice_load, p.add_int(twice_load, 1)?)?;
        let decayed = p.mul(coefficient, self.recent_cpu)?;
        self.recent_cpu = p.add_int(decayed, self.nice)?;
        Ok(())
    }

    fn priority(&self) -> Result<i32> {
        let p = self.policy;
        let quarter = p.div_int(self.recent_cpu, 4)?;
        let raw = p.sub(p.from_int(PRI_MAX)?, quarter)?;
        let penalty = p.mul_int(p.from_int(self.nice)?, 2)?;
        let priority = p.sub(raw, penalty)?;
        Ok(priority.to_int_round().clamp(PRI_MIN, PRI_MAX))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    SimpleLogger::new()
        .with_level(args.log_level)
        .init()
        .context("failed to initialise logger")?;

    log::info!(
        "seconds={} ready={} nice={} ticks_per_second={} policy={:?}",
        args.seconds,
        args.ready,
        args.nice,
        args.ticks_per_second,
        args.policy
    );

    let mut sched = Scheduler::new(args.policy.into(), args.nice)?;
    log::debug!("decay={:?} gain={:?}", sched.decay, sched.gain);

    println!("{:>4} {:>10} {:>12} {:>8}", "sec", "load_avg", "recent_cpu", "priority");
    for second in 1..=args.seconds {
        for _ in 0..args.ticks_per_second {
            sched.tick()?;
        }
        sched
            .update_load_avg(args.ready)
            .with_context(|| format!("load average at second {second}"))?;
        sched
            .update_recent_cpu()
            .with_context(|| format!("recent_cpu at second {second}"))?;
        let priority = sched.priority()?;

        log::debug!(
            "second {} raw load_avg={} recent_cpu={}",
            second,
            sched.load_avg.raw(),
            sched.recent_cpu.raw()
        );
        println!(
            "{:>4} {:>10.2} {:>12.2} {:>8}",
            second, sched.load_avg, sched.recent_cpu, priority
        );
    }

    println!();
    println!(
        "Final load average (rounded x100): {}",
        sched.policy.mul_int(sched.load_avg, 100)?.to_int_round()
    );
    Ok(())
}
