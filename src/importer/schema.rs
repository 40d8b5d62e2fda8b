// ==========================================
// 木工车间产量系统 - 表格列定义
// ==========================================
// 导出列顺序固定；导入按表头名称取值（支持别名）
// ==========================================

pub const SHEET_NAME: &str = "Registros de Produção";

pub const COL_ID: &str = "ID (Sistema)";
pub const COL_MACHINE: &str = "Máquina";
pub const COL_DATE: &str = "Data";
pub const COL_HOURS: &str = "Horas Trabalhadas";
pub const COL_OUTPUT: &str = "Métrica Principal (Produzido)";
pub const COL_OUTPUT_PER_HOUR: &str = "Produtividade/H";
pub const COL_PERCENT_OF_TARGET: &str = "% da Meta Diária";
pub const COL_COMMISSION_UNITS: &str = "Unidades Comissionáveis";
pub const COL_TOTAL_COMMISSION: &str = "Comissão Total (R$)";
pub const COL_CREATED_AT: &str = "Registrado em";

/// 操作员列至少两列
pub const MIN_OPERATOR_COLUMNS: usize = 2;

/// 操作员列名（槽位从 0 开始，列名从 1 开始）
pub fn operator_column(slot: usize) -> String {
    format!("Operador {}", slot + 1)
}

/// 列别名（导入时依次尝试）
pub fn aliases(column: &str) -> &'static [&'static str] {
    match column {
        COL_ID => &["ID (Sistema)", "ID", "Id"],
        COL_MACHINE => &["Máquina", "Maquina", "Machine"],
        COL_DATE => &["Data", "Date"],
        COL_HOURS => &["Horas Trabalhadas", "Horas", "Hours"],
        COL_OUTPUT => &["Métrica Principal (Produzido)", "Produzido", "Output"],
        COL_COMMISSION_UNITS => &["Unidades Comissionáveis", "Commission Units"],
        COL_TOTAL_COMMISSION => &["Comissão Total (R$)", "Comissão Total", "Total Commission"],
        COL_CREATED_AT => &["Registrado em", "Created At"],
        _ => &[],
    }
}

/// 导出表头
pub fn export_headers(operator_columns: usize) -> Vec<String> {
    let mut headers = vec![
        COL_ID.to_string(),
        COL_MACHINE.to_string(),
        COL_DATE.to_string(),
    ];
    headers.extend((0..operator_columns.max(MIN_OPERATOR_COLUMNS)).map(operator_column));
    headers.extend(
        [
            COL_HOURS,
            COL_OUTPUT,
            COL_OUTPUT_PER_HOUR,
            COL_PERCENT_OF_TARGET,
            COL_COMMISSION_UNITS,
            COL_TOTAL_COMMISSION,
            COL_CREATED_AT,
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    headers
}

/// 表头中是否存在该列（含别名）
pub fn has_column(headers: &[String], column: &str) -> bool {
    let names = aliases(column);
    if names.is_empty() {
        return headers.iter().any(|h| h == column);
    }
    headers.iter().any(|h| names.contains(&h.as_str()))
}
