//! beanqueue CLI
//!
//! Command-line interface for poking at a beanstalkd server.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use beanqueue::protocol::Outcome;
use beanqueue::{BeanError, Config, Connection, Result};

/// beanqueue CLI
#[derive(Parser, Debug)]
#[command(name = "beanqueue-cli")]
#[command(about = "CLI for the beanstalkd job queue")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:11300")]
    server: String,

    /// Tube to use/watch instead of "default"
    #[arg(short, long)]
    tube: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enqueue a job
    Put {
        /// Job payload
        data: String,

        /// Priority (lower runs sooner)
        #[arg(long, default_value = "65536")]
        pri: u32,

        /// Seconds before the job becomes ready
        #[arg(long, default_value = "0")]
        delay: u32,

        /// Seconds a worker gets to finish the job
        #[arg(long, default_value = "120")]
        ttr: u32,
    },

    /// Reserve the next ready job and print it
    Reserve {
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u32>,
    },

    /// Inspect a job (or the next buried job) without reserving it
    Peek {
        /// Job id; omit to peek the next buried job
        id: Option<u64>,
    },

    /// Inspect the next ready job
    PeekReady,

    /// Delete a job
    Delete {
        /// Job id
        id: u64,
    },

    /// Kick buried jobs back to ready
    Kick {
        /// Most jobs to kick
        #[arg(default_value = "10")]
        bound: u32,
    },

    /// Server-wide statistics
    Stats,

    /// Statistics for one tube
    StatsTube {
        /// Tube name
        tube: String,
    },

    /// List all tubes on the server
    ListTubes,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder().server_addr(&args.server).build();
    let mut conn = Connection::connect(&config)?;

    if let Some(tube) = &args.tube {
        conn.use_tube(tube)?;
        conn.set_watchlist(&[tube.as_str()])?;
    }

    match args.command {
        Commands::Put { data, pri, delay, ttr } => {
            let reply = conn.put(data.as_bytes(), pri, delay, ttr)?;
            match reply.outcome {
                Outcome::Buried => println!("buried as job {}", fmt_jid(&reply)),
                _ => println!("inserted job {}", fmt_jid(&reply)),
            }
        }

        Commands::Reserve { timeout } => {
            let reply = match timeout {
                Some(secs) => conn.reserve_with_timeout(secs)?,
                None => conn.reserve()?,
            };
            if reply.outcome == Outcome::TimedOut {
                println!("timed out with no job");
                return Ok(());
            }
            print_job(&reply);
        }

        Commands::Peek { id } => {
            print_job(&conn.peek(id)?);
        }

        Commands::PeekReady => {
            print_job(&conn.peek_ready()?);
        }

        Commands::Delete { id } => {
            conn.delete(id)?;
            println!("deleted job {id}");
        }

        Commands::Kick { bound } => {
            let reply = conn.kick(bound)?;
            println!("kicked {} job(s)", reply.count().unwrap_or(0));
        }

        Commands::Stats => {
            print_yaml(&conn.stats()?)?;
        }

        Commands::StatsTube { tube } => {
            print_yaml(&conn.stats_tube(&tube)?)?;
        }

        Commands::ListTubes => {
            print_yaml(&conn.list_tubes()?)?;
        }
    }

    Ok(())
}

fn fmt_jid(reply: &beanqueue::Reply) -> String {
    reply.jid().map_or_else(|| "?".to_string(), |jid| jid.to_string())
}

fn print_job(reply: &beanqueue::Reply) {
    println!("job {}", fmt_jid(reply));
    if let Some(body) = reply.raw_body() {
        println!("{}", String::from_utf8_lossy(body));
    }
}

fn print_yaml(reply: &beanqueue::Reply) -> Result<()> {
    let value = reply
        .yaml_body()
        .ok_or_else(|| BeanError::UnexpectedResponse("reply had no stats body".to_string()))?;
    let text = serde_yaml::to_string(value).map_err(|e| BeanError::BodyDecode(e.to_string()))?;
    print!("{text}");
    Ok(())
}
