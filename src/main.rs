// ==========================================
// 木工车间产量系统 - 命令行入口
// ==========================================

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use production_tracker::api::{ApiError, EntryForm, MachineDashboard, Notice};
use production_tracker::app::{get_default_db_path, AppState};
use production_tracker::domain::{CommissionReport, ContentTab, YearMonth};
use production_tracker::i18n::t;
use production_tracker::importer::exporter::format_percent;
use production_tracker::logging;

#[derive(Debug, Parser)]
#[command(name = "production-tracker", version)]
#[command(about = "Controle de produção diária e comissão por máquina")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Meta, gráfico e registros de uma máquina.
    Dashboard {
        file: PathBuf,
        machine: Option<String>,
    },
    /// Comissão por operador no mês (ou acumulada).
    Report {
        file: PathBuf,
        machine: Option<String>,
        /// Mês no formato AAAA-MM.
        #[arg(value_parser = parse_month)]
        month: Option<YearMonth>,
    },
    /// Meses disponíveis para o relatório.
    Months { file: PathBuf },
    /// Registra a produção do dia e exporta a planilha atualizada.
    Add {
        /// Planilha de origem; inexistente começa sem registros.
        file: PathBuf,
        machine: String,
        /// Data no formato AAAA-MM-DD.
        date: String,
        output: String,
        hours: String,
        operators: Vec<String>,
    },
    /// Exclui um registro e exporta a planilha atualizada.
    Delete { file: PathBuf, id: String },
    /// Lista, consulta ou altera a meta diária.
    Target {
        machine: Option<String>,
        value: Option<String>,
    },
    /// Exporta os registros para xlsx ou csv.
    Export { file: PathBuf, out: PathBuf },
    /// Configurações globais.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Get { key: String },
    Set { key: String, value: String },
    /// Imprime todas as configurações em JSON.
    Snapshot,
    /// Restaura configurações a partir de um snapshot JSON.
    Restore { file: PathBuf },
}

fn parse_month(raw: &str) -> Result<YearMonth, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if std::env::var("PRODUCTION_TRACKER_LOG_FORMAT").as_deref() == Ok("json") {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("木工车间产量系统 版本: {}", production_tracker::VERSION);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // API 错误以本地化提示输出
            match err.downcast_ref::<ApiError>() {
                Some(api_err) => eprintln!("{}", api_err.to_notice()),
                None => eprintln!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let mut state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match command {
        Command::Dashboard { file, machine } => {
            load(&mut state, &file).await?;
            if let Some(machine) = machine {
                state.session.select_machine(&state.catalog, &machine)?;
            }
            state.session.switch_tab(ContentTab::Dashboard);

            let view = state
                .report_api
                .dashboard(&state.session.store, &state.session.current_machine)?;
            print_dashboard(&view);
        }
        Command::Report {
            file,
            machine,
            month,
        } => {
            load(&mut state, &file).await?;
            if let Some(machine) = machine {
                state.session.select_machine(&state.catalog, &machine)?;
            }
            state.session.switch_tab(ContentTab::Report);
            state.select_report_month(month);

            let report = state.report_api.commission_report(
                &state.session.store,
                &state.session.current_machine,
                state.session.report_month,
            )?;
            print_report(&report, state.catalog.display_name(&report.machine));
            if let Some(notice) = state.report_api.report_notice(&report) {
                println!("{}", notice.message);
            }
        }
        Command::Months { file } => {
            load(&mut state, &file).await?;
            for option in state.report_api.month_options(&state.session.store) {
                let value = option.value.map(|m| m.to_string()).unwrap_or_default();
                println!("{:<8} {}", value, option.label);
            }
        }
        Command::Add {
            file,
            machine,
            date,
            output,
            hours,
            operators,
        } => {
            if file.exists() {
                load(&mut state, &file).await?;
            } else {
                tracing::info!("arquivo {} inexistente, iniciando sem registros", file.display());
            }

            let form = EntryForm {
                machine,
                date,
                output,
                hours,
                operators,
            };
            let outcome = state.production_api.submit(&mut state.session.store, &form)?;
            state.sync_report_month();

            println!("{}", outcome.record.id);
            report_notice(&outcome.notice);
        }
        Command::Delete { file, id } => {
            load(&mut state, &file).await?;

            let outcome = state.production_api.delete(&mut state.session.store, &id)?;
            state.sync_report_month();
            report_notice(&outcome.notice);
        }
        Command::Target { machine, value } => match (machine, value) {
            (None, _) => {
                for (machine, target) in state.target_api.list_targets()? {
                    println!("{:<8} {}", machine, target);
                }
            }
            (Some(machine), None) => {
                let key = resolve_key(&state, &machine)?;
                println!("{}", state.target_api.current_target(&key)?);
            }
            (Some(machine), Some(value)) => {
                let key = resolve_key(&state, &machine)?;
                let notice = state.target_api.update_target(&key, &value)?;
                report_notice(&notice);
            }
        },
        Command::Export { file, out } => {
            load(&mut state, &file).await?;

            let notice = state.production_api.export_to(&mut state.session.store, &out)?;
            report_notice(&notice);
        }
        Command::Config(sub) => run_config(&state, sub)?,
    }

    Ok(())
}

/// 全局配置（config_kv）的读写与快照
fn run_config(state: &AppState, command: ConfigCommand) -> anyhow::Result<()> {
    let config = &state.config_manager;
    match command {
        ConfigCommand::Get { key } => {
            match config.get_global_config_value(&key).map_err(ApiError::from)? {
                Some(value) => println!("{}", value),
                None => bail!("configuração inexistente: {}", key),
            }
        }
        ConfigCommand::Set { key, value } => {
            config
                .set_global_config_value(&key, &value)
                .map_err(ApiError::from)?;
            tracing::info!("配置已更新: {} = {}", key, value);
        }
        ConfigCommand::Snapshot => {
            println!("{}", config.get_config_snapshot().map_err(ApiError::from)?)
        }
        ConfigCommand::Restore { file } => {
            let body = std::fs::read_to_string(&file)
                .with_context(|| format!("não foi possível ler {}", file.display()))?;
            let count = config
                .restore_config_from_snapshot(&body)
                .map_err(ApiError::from)?;
            println!("{}", count);
        }
    }
    Ok(())
}

fn resolve_key(state: &AppState, machine: &str) -> anyhow::Result<String> {
    state
        .catalog
        .resolve(machine)
        .map(|p| p.key.clone())
        .ok_or_else(|| ApiError::UnknownMachine(machine.to_string()).into())
}

async fn load(state: &mut AppState, file: &Path) -> anyhow::Result<()> {
    let outcome = state.load_file(file).await?;
    for skipped in &outcome.report.skipped {
        tracing::warn!("linha {}: {}", skipped.row_number, skipped.reason);
    }
    report_notice(&outcome.notice);
    Ok(())
}

fn report_notice(notice: &Notice) {
    eprintln!("{}", notice);
}

fn print_dashboard(view: &MachineDashboard) {
    println!(
        "{} | meta diária: {} {}",
        view.profile.name, view.target, view.profile.unit
    );
    println!();
    println!("{:<12} {:>10}", "Data", view.profile.unit);
    for (date, output) in view.chart.dates.iter().zip(&view.chart.outputs) {
        println!("{:<12} {:>10}", date, output);
    }
    println!();
    println!(
        "{:<36} {:<12} {:>8} {:>8} {:>10} {:<20}",
        "ID", "Data", "Prod.", "% Meta", "Comissão", "Operadores"
    );
    for row in &view.rows {
        let percent = format_percent(row.percent_of_target);
        let marker = if row.meets_target { "*" } else { " " };
        println!(
            "{:<36} {:<12} {:>8} {:>7}{} {:>10} {:<20}",
            row.id,
            row.date,
            row.output,
            if percent.is_empty() { "-".to_string() } else { percent },
            marker,
            format!("{:.2}", row.total_commission),
            row.operators.join(" / ")
        );
    }
}

fn print_report(report: &CommissionReport, machine_name: &str) {
    let month = report
        .month
        .map(|m| m.label())
        .unwrap_or_else(|| t("common.all_months"));
    println!("{} | {}", machine_name, month);

    if !report.is_commissionable || report.is_empty() {
        return;
    }

    for op in &report.operators {
        println!("{:<32} R$ {:>10.2}", op.operator, op.total_commission);
    }
    println!(
        "{:<32} R$ {:>10.2}  ({} registros)",
        "Total",
        report.total_commission,
        report.record_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_with_month() {
        let cli = Cli::try_parse_from(["production-tracker", "report", "f.xlsx", "SCM", "2024-05"])
            .unwrap();
        match cli.command {
            Command::Report { machine, month, .. } => {
                assert_eq!(machine.as_deref(), Some("SCM"));
                assert_eq!(month, YearMonth::new(2024, 5));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["production-tracker", "report", "f.xlsx", "SCM", "2024-13"])
            .is_err());
    }

    #[test]
    fn test_parse_add_collects_operators() {
        let cli = Cli::try_parse_from([
            "production-tracker", "add", "f.xlsx", "Giben", "2024-05-10", "520", "8", "Davi", "Iago",
        ])
        .unwrap();
        match cli.command {
            Command::Add { operators, hours, .. } => {
                assert_eq!(operators, vec!["Davi", "Iago"]);
                assert_eq!(hours, "8");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_config() {
        let cli =
            Cli::try_parse_from(["production-tracker", "config", "set", "export.dir", "/tmp"]).unwrap();
        match cli.command {
            Command::Config(ConfigCommand::Set { key, value }) => {
                assert_eq!(key, "export.dir");
                assert_eq!(value, "/tmp");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["production-tracker", "config", "drop"]).is_err());
    }
}
