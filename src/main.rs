// ==========================================
// 种植批次规则引擎 - 命令行入口
// ==========================================
// 用法: batch-rules [--rules <path>] [request.json|-]
// 输出: 校验结论(JSON, stdout); 日志写 stderr
// 退出码: 0 放行 / 1 拒绝 / 2 用法或配置错误
// ==========================================

use anyhow::{bail, Context, Result};
use cultivation_batch_rules::engine::SystemClock;
use cultivation_batch_rules::{logging, BatchValidationApi};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "用法: batch-rules [--rules <path>] [request.json|-]";

/// 命令行参数
#[derive(Debug, Default)]
struct CliArgs {
    rules: Option<PathBuf>,
    input: Option<String>, // None 或 "-" → stdin
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--rules" => {
                let path = args.next().context("--rules 缺少路径参数")?;
                parsed.rules = Some(PathBuf::from(path));
            }
            "-h" | "--help" => bail!("{}", USAGE),
            flag if flag.starts_with("--") => bail!("未知参数: {}", flag),
            _ if parsed.input.is_some() => bail!("只能提供一个请求文件"),
            _ => parsed.input = Some(arg),
        }
    }

    Ok(parsed)
}

fn read_request(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("读取标准输入失败")?;
            Ok(buf)
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("读取请求文件失败: {}", path))
        }
    }
}

fn run() -> Result<bool> {
    let args = parse_args(std::env::args().skip(1))?;

    tracing::info!(version = cultivation_batch_rules::VERSION, "种植批次规则引擎启动");

    let api = BatchValidationApi::load(args.rules.as_deref(), Arc::new(SystemClock))
        .context("规则加载失败")?;
    let request = read_request(args.input.as_deref())?;

    let verdict = api.validate_json(&request);
    println!(
        "{}",
        serde_json::to_string_pretty(&verdict).context("结论序列化失败")?
    );

    Ok(verdict.is_valid())
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("错误: {:#}", err);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_rules_and_input() {
        let parsed = parse_args(args(&["--rules", "rules.json", "req.json"])).unwrap();
        assert_eq!(parsed.rules, Some(PathBuf::from("rules.json")));
        assert_eq!(parsed.input.as_deref(), Some("req.json"));
    }

    #[test]
    fn test_parse_defaults_to_stdin() {
        let parsed = parse_args(Vec::new()).unwrap();
        assert!(parsed.rules.is_none());
        assert!(parsed.input.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_usage() {
        assert!(parse_args(args(&["--rules"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
    }
}
