use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use dairy_ledger::{
    assistant::{ChatSession, DairyBackend, Interpreter},
    billing::Quantities,
    client::{DairyClient, DEFAULT_API_URL},
    errors::ServiceError,
    report,
    services::{CreateCustomerInput, RecordVariationInput},
    types::CustomerId,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "dairy-cli", about = "Command-line client for the dairy ledger API", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "DAIRY_API_URL",
        default_value = DEFAULT_API_URL,
        help = "Base URL of the dairy-ledger server"
    )]
    api_url: String,
    #[arg(
        long,
        global = true,
        default_value_t = 10,
        help = "Request timeout in seconds"
    )]
    timeout_secs: u64,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Customers(CustomersCommands),
    #[command(subcommand)]
    Variations(VariationsCommands),
    /// Day-by-day sheet with totals
    Sheet(MonthArgs),
    /// Bill for a whole month
    Bill(MonthArgs),
    /// Days with an explicit variation
    Summary(MonthArgs),
    /// Run one free-text command through the assistant
    Ask(AskArgs),
    /// Interactive assistant session
    Chat,
}

#[derive(Subcommand)]
enum CustomersCommands {
    /// List all customers
    List,
    /// Add a customer
    Add(AddCustomerArgs),
    /// Show one customer
    Show {
        #[arg(help = "Customer id")]
        id: String,
    },
}

#[derive(Subcommand)]
enum VariationsCommands {
    /// Record (or overwrite) the quantities delivered on one day
    Log(LogVariationArgs),
}

#[derive(Args)]
struct AddCustomerArgs {
    #[arg(long, help = "Customer name")]
    name: String,
    #[arg(long, default_value = "", help = "Delivery address")]
    address: String,
    #[arg(long, default_value = "", help = "Phone number")]
    phone: String,
    #[arg(long, default_value_t = 0.0, help = "Default morning liters")]
    morning: f64,
    #[arg(long, default_value_t = 0.0, help = "Default evening liters")]
    evening: f64,
    #[arg(long, help = "Price per liter; the server default applies when omitted")]
    price: Option<f64>,
}

#[derive(Args)]
struct LogVariationArgs {
    #[arg(long, help = "Customer id")]
    customer: String,
    #[arg(long, help = "Date as YYYY-MM-DD; defaults to today")]
    date: Option<NaiveDate>,
    #[arg(long, default_value_t = 0.0, help = "Morning liters")]
    morning: f64,
    #[arg(long, default_value_t = 0.0, help = "Evening liters")]
    evening: f64,
}

#[derive(Args)]
struct MonthArgs {
    #[arg(help = "Customer id")]
    id: String,
    #[arg(long, help = "Month (1-12); defaults to the current month")]
    month: Option<u32>,
    #[arg(long, help = "Year; defaults to the current year")]
    year: Option<i32>,
}

impl MonthArgs {
    fn resolve(&self) -> Result<(CustomerId, u32, i32)> {
        let today = Local::now().date_naive();
        let id = CustomerId::parse(&self.id)?;
        Ok((
            id,
            self.month.unwrap_or(today.month()),
            self.year.unwrap_or(today.year()),
        ))
    }
}

#[derive(Args)]
struct AskArgs {
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Send the command to the server's /assistant endpoint instead of interpreting it locally"
    )]
    remote: bool,
    #[arg(required = true, num_args = 1.., help = "The command, e.g. log 2 liters morning for Raj today")]
    text: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DairyClient::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))?;

    if let Err(err) = run(&client, cli.command, cli.json).await {
        if let Some(service_err) = err.downcast_ref::<ServiceError>() {
            if service_err.is_connectivity() {
                anyhow::bail!(
                    "Connection Error! Is the dairy-ledger server running at {}?",
                    client.base_url()
                );
            }
        }
        return Err(err);
    }
    Ok(())
}

async fn run(client: &DairyClient, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Customers(command) => handle_customers_command(client, command, json).await,
        Commands::Variations(VariationsCommands::Log(args)) => {
            let customer_id = CustomerId::parse(&args.customer)?;
            let date = args.date.unwrap_or_else(|| Local::now().date_naive());
            let input = RecordVariationInput::new(
                customer_id,
                date,
                Quantities::new(args.morning, args.evening),
            );
            client
                .record_variation(input)
                .await
                .context("failed to log variation")?;
            println!("Variation on {} logged!", date);
            Ok(())
        }
        Commands::Sheet(args) => {
            let (id, month, year) = args.resolve()?;
            let sheet = client.monthly_sheet(id, month, year).await?;
            if json {
                print_json(&sheet)
            } else {
                println!("{}", report::render_sheet(&sheet, month, year));
                Ok(())
            }
        }
        Commands::Bill(args) => {
            let (id, month, year) = args.resolve()?;
            let bill = client.monthly_bill(id, month, year).await?;
            if json {
                print_json(&bill)
            } else {
                println!("{}", report::render_bill(&bill));
                Ok(())
            }
        }
        Commands::Summary(args) => {
            let (id, month, year) = args.resolve()?;
            let summary = client.variations_summary(id, month, year).await?;
            if json {
                print_json(&summary)
            } else {
                println!("{}", report::render_variations(&summary));
                Ok(())
            }
        }
        Commands::Ask(args) => {
            let text = args.text.join(" ");
            let reply = if args.remote {
                client.ask(&text).await?
            } else {
                Interpreter::new(client.clone()).respond(&text).await
            };
            println!("{}", reply);
            Ok(())
        }
        Commands::Chat => chat(client).await,
    }
}

async fn handle_customers_command(
    client: &DairyClient,
    command: CustomersCommands,
    json: bool,
) -> Result<()> {
    match command {
        CustomersCommands::List => {
            let customers = client.list_customers().await?;
            if json {
                return print_json(&customers);
            }
            println!("{}", report::render_customer_list(&customers));
        }
        CustomersCommands::Add(args) => {
            let input = CreateCustomerInput {
                name: args.name,
                address: args.address,
                phone_number: args.phone,
                default_milk_morning: args.morning,
                default_milk_evening: args.evening,
                price_per_liter: args.price,
            };
            let created = client
                .create_customer(input)
                .await
                .context("failed to add customer")?;
            if json {
                return print_json(&created);
            }
            println!("Customer '{}' added! (id {})", created.name, created.id);
        }
        CustomersCommands::Show { id } => {
            let customer = client.get_customer(CustomerId::parse(&id)?).await?;
            if json {
                return print_json(&customer);
            }
            println!("{}", report::render_customer(&customer));
        }
    }
    Ok(())
}

/// Reads commands line by line until EOF, `exit` or `quit`.
async fn chat(client: &DairyClient) -> Result<()> {
    let interpreter = Interpreter::new(client.clone());
    let mut session = ChatSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Assistant ready. Type 'history' to see recent exchanges, 'exit' to leave.");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            "history" => {
                for exchange in session.history() {
                    println!("you: {}\nassistant: {}\n", exchange.query, exchange.reply);
                }
                continue;
            }
            _ => {}
        }

        let reply = interpreter.respond(line).await;
        println!("{}", reply);
        session.record(line, reply);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
