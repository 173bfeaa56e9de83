//! HR portal command-line client.
//!
//! Lists, filters, and pages employees, and creates, edits, and deletes
//! employees and contracts against the portal's REST backend.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use hr_portal::browse;
use hr_portal::commands::{self, ContractChanges, EmployeeChanges, ListRequest};
use hr_portal::core::display::{self, DELETE_EMPLOYEE_WARNING};
use hr_portal::core::types::{CONTRACT_TYPES, ContractDraft, EmployeeDraft, PERMANENT};
use hr_portal::core::validation::ValidationError;
use hr_portal::exit_codes;
use hr_portal::io::api::ApiClient;
use hr_portal::io::config::{DEFAULT_CONFIG_FILE, PortalConfig, resolve_config, write_config};
use hr_portal::logging;

#[derive(Parser)]
#[command(name = "hr-portal", version, about = "HR employee and contract portal")]
struct Cli {
    /// Config file (TOML).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Backend base URL; overrides the config file and `HR_PORTAL_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List, add, update, or delete employees.
    #[command(subcommand)]
    Employees(EmployeeCommand),
    /// List, add, update, or delete contracts.
    #[command(subcommand)]
    Contracts(ContractCommand),
    /// Interactive employee list with filters and paging.
    Browse,
    /// Write a default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum EmployeeCommand {
    List(ListArgs),
    Add(EmployeeArgs),
    /// Change the given fields; the rest keep their stored values.
    Update {
        id: i64,
        #[command(flatten)]
        fields: EmployeeUpdateArgs,
    },
    /// Delete an employee and all of their contracts.
    Delete {
        id: i64,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ContractCommand {
    List,
    Add(ContractArgs),
    /// Change the given fields; the rest keep their stored values.
    Update {
        id: i64,
        #[command(flatten)]
        fields: ContractUpdateArgs,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct ListArgs {
    /// Filter by name.
    #[arg(long)]
    search: Option<String>,
    /// Only contracts expiring this month.
    #[arg(long)]
    expiring: bool,
    #[arg(long, conflicts_with = "part_time")]
    full_time: bool,
    #[arg(long)]
    part_time: bool,
    /// 1-based page to show. Each earlier page costs one request; capped
    /// at 1000.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct EmployeeArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    mobile: String,
    #[arg(long)]
    address: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct ContractArgs {
    #[arg(long)]
    employee_id: i64,
    #[arg(
        long = "type",
        default_value = PERMANENT,
        value_parser = PossibleValuesParser::new(CONTRACT_TYPES),
    )]
    contract_type: String,
    /// YYYY-MM-DD
    #[arg(long)]
    start: String,
    /// YYYY-MM-DD; ignored for permanent contracts.
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    part_time: bool,
    /// Hours per week; fixed at 40 for full-time.
    #[arg(long)]
    hours: Option<u32>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
struct EmployeeUpdateArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    mobile: Option<String>,
    /// Empty string clears the address.
    #[arg(long)]
    address: Option<String>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
struct ContractUpdateArgs {
    #[arg(long)]
    employee_id: Option<i64>,
    #[arg(long = "type", value_parser = PossibleValuesParser::new(CONTRACT_TYPES))]
    contract_type: Option<String>,
    #[arg(long)]
    start: Option<String>,
    /// Empty string clears the end date.
    #[arg(long)]
    end: Option<String>,
    #[arg(long, conflicts_with = "part_time")]
    full_time: bool,
    #[arg(long)]
    part_time: bool,
    #[arg(long)]
    hours: Option<u32>,
}

impl From<EmployeeArgs> for EmployeeDraft {
    fn from(args: EmployeeArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            mobile_number: args.mobile,
            address: args.address,
        }
    }
}

impl From<ContractArgs> for ContractDraft {
    fn from(args: ContractArgs) -> Self {
        Self {
            employee_id: args.employee_id,
            contract_type: args.contract_type,
            start_date: args.start,
            end_date: args.end,
            full_time: !args.part_time,
            hours_per_week: args.hours,
        }
    }
}

impl From<EmployeeUpdateArgs> for EmployeeChanges {
    fn from(args: EmployeeUpdateArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            mobile_number: args.mobile,
            address: args.address,
        }
    }
}

impl From<ContractUpdateArgs> for ContractChanges {
    fn from(args: ContractUpdateArgs) -> Self {
        let full_time = match (args.full_time, args.part_time) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Self {
            employee_id: args.employee_id,
            contract_type: args.contract_type,
            start_date: args.start,
            end_date: args.end,
            full_time,
            hours_per_week: args.hours,
        }
    }
}

impl From<ListArgs> for ListRequest {
    fn from(args: ListArgs) -> Self {
        Self {
            search: args.search,
            expiring: args.expiring,
            full_time: args.full_time,
            part_time: args.part_time,
            page: args.page,
        }
    }
}

fn main() {
    logging::init();
    let code = match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ValidationError>().is_some() {
        exit_codes::INVALID_INPUT
    } else {
        exit_codes::FAILED
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::InitConfig { force } => {
            cmd_init_config(&cli.config, force)?;
            Ok(exit_codes::OK)
        }
        Command::Employees(command) => {
            let (api, page_size) = connect(&cli.config, cli.api_url)?;
            cmd_employees(&api, page_size, command)
        }
        Command::Contracts(command) => {
            let (api, page_size) = connect(&cli.config, cli.api_url)?;
            cmd_contracts(&api, page_size, command)
        }
        Command::Browse => {
            let (api, page_size) = connect(&cli.config, cli.api_url)?;
            let stdin = io::BufReader::new(io::stdin());
            browse::run(Arc::new(api), page_size, stdin, &mut io::stdout())?;
            Ok(exit_codes::OK)
        }
    }
}

fn connect(config_path: &Path, api_url: Option<String>) -> Result<(ApiClient, u32)> {
    let config = resolve_config(config_path, api_url)?;
    let api = ApiClient::new(&config.api)?;
    debug!(base_url = api.base_url(), page_size = config.list.page_size, "api client ready");
    Ok((api, config.list.page_size))
}

fn cmd_employees(api: &ApiClient, page_size: u32, command: EmployeeCommand) -> Result<i32> {
    let mut stdout = io::stdout().lock();
    match command {
        EmployeeCommand::List(args) => {
            let (controller, notice) = commands::list_employees(api, page_size, &args.into());
            if let Some(notice) = &notice {
                commands::write_notice(&mut io::stderr(), notice)?;
            }
            commands::write_employee_screen(&mut stdout, &controller)?;
            if !commands::is_settled_ok(&controller) {
                return Ok(exit_codes::FAILED);
            }
        }
        EmployeeCommand::Add(fields) => {
            let (employee, notice) = commands::save_employee(api, None, fields.into())?;
            commands::write_notice(&mut stdout, &notice)?;
            writeln!(stdout, "{}", display::employee_row(&employee))?;
        }
        EmployeeCommand::Update { id, fields } => {
            let (employee, notice) =
                commands::update_employee(api, page_size, id, fields.into())?;
            commands::write_notice(&mut stdout, &notice)?;
            writeln!(stdout, "{}", display::employee_row(&employee))?;
        }
        EmployeeCommand::Delete { id, yes } => {
            if !confirmed("employee", id, yes, Some(DELETE_EMPLOYEE_WARNING)) {
                return Ok(exit_codes::INVALID_INPUT);
            }
            let notice = commands::delete_employee(api, id)?;
            commands::write_notice(&mut stdout, &notice)?;
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_contracts(api: &ApiClient, page_size: u32, command: ContractCommand) -> Result<i32> {
    let mut stdout = io::stdout().lock();
    match command {
        ContractCommand::List => commands::list_contracts(api, page_size, &mut stdout)?,
        ContractCommand::Add(fields) => {
            let (contract, notice) = commands::save_contract(api, None, fields.into())?;
            commands::write_notice(&mut stdout, &notice)?;
            writeln!(stdout, "{}", display::contract_row(&contract, &[]))?;
        }
        ContractCommand::Update { id, fields } => {
            let (contract, notice) = commands::update_contract(api, id, fields.into())?;
            commands::write_notice(&mut stdout, &notice)?;
            writeln!(stdout, "{}", display::contract_row(&contract, &[]))?;
        }
        ContractCommand::Delete { id, yes } => {
            if !confirmed("contract", id, yes, None) {
                return Ok(exit_codes::INVALID_INPUT);
            }
            let notice = commands::delete_contract(api, id)?;
            commands::write_notice(&mut stdout, &notice)?;
        }
    }
    Ok(exit_codes::OK)
}

/// Deletes require `--yes`; otherwise explain what would be removed.
fn confirmed(noun: &str, id: i64, yes: bool, warning: Option<&str>) -> bool {
    if !yes {
        eprintln!("Refusing to delete {noun} #{id} without --yes.");
        if let Some(warning) = warning {
            eprintln!("{warning}");
        }
    }
    yes
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &PortalConfig::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}
