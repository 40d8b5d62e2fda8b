// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持葡萄牙语（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["pt-BR", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（不支持的语言回退为默认语言）
///
/// # 参数
/// - locale: 语言代码（"pt-BR" 或 "en"）
pub fn set_locale(locale: &str) {
    let chosen = SUPPORTED_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(locale.trim()))
        .copied()
        .unwrap_or(DEFAULT_LOCALE);
    rust_i18n::set_locale(chosen);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use production_tracker::i18n::t;
/// let msg = t("common.all_months");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use production_tracker::i18n::t_with_args;
/// let msg = t_with_args("import.loaded", &[("count", "12")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    pub(crate) static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        // 不支持的语言回退
        set_locale("zh-CN");
        assert_eq!(current_locale(), DEFAULT_LOCALE);

        set_locale("pt-br");
        assert_eq!(current_locale(), "pt-BR");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        assert_eq!(t("common.all_months"), "Todos os Meses (Acumulado)");

        set_locale("en");
        assert_eq!(t("common.all_months"), "All Months (Cumulative)");

        set_locale(DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("pt-BR");
        let msg = t_with_args("import.loaded", &[("count", "7")]);
        assert_eq!(msg, "7 registros carregados do arquivo.");

        set_locale("en");
        let msg = t_with_args("production.not_found", &[("id", "abc")]);
        assert!(msg.contains("abc"));
        assert!(msg.contains("Record not found"));

        set_locale(DEFAULT_LOCALE);
    }
}
