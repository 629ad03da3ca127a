use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use exam_core::model::{ExamId, Role, SessionContext, TimeLimit};
use services::{
    AppServices, Clock, DEFAULT_BASE_URL, ExamApiConfig, ExamListing, InMemoryExamApi,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidExamId { raw: String },
    InvalidTimeLimit { raw: String },
    InvalidRole { raw: String },
    InvalidApiUrl { raw: String },
    InvalidEnv { key: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidExamId { raw } => write!(f, "invalid --exam-id value: {raw}"),
            ArgsError::InvalidTimeLimit { raw } => {
                write!(f, "invalid --time-limit value: {raw}")
            }
            ArgsError::InvalidRole { raw } => write!(f, "invalid --role value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api-url value: {raw}"),
            ArgsError::InvalidEnv { key, raw } => write!(f, "invalid {key} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
    identity: Option<SessionContext>,
    exams: Vec<ExamListing>,
}

impl UiApp for DesktopApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn identity(&self) -> Option<SessionContext> {
        self.identity.clone()
    }

    fn exams(&self) -> Vec<ExamListing> {
        self.exams.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    api_url: String,
    api_token: Option<String>,
    exam_id: ExamId,
    time_limit: TimeLimit,
    email: Option<String>,
    role: Role,
    demo: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-url <url>] [--api-token <token>]");
    eprintln!("                      [--exam-id <id>] [--time-limit <minutes>]");
    eprintln!("                      [--email <email>] [--role <student|moderator|admin>]");
    eprintln!("                      [--demo]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url {DEFAULT_BASE_URL}");
    eprintln!("  --exam-id 1");
    eprintln!("  --time-limit 30");
    eprintln!("  --role student");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_API_URL, EXAM_API_TOKEN, EXAM_ID, EXAM_TIME_LIMIT,");
    eprintln!("  EXAM_USER_EMAIL, EXAM_USER_ROLE, EXAM_DEMO=1, RUST_LOG");
}

impl Args {
    /// Defaults, overridden by whatever `lookup` finds in the environment.
    /// Invalid values are rejected the same way as their flags.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ArgsError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut args = Self {
            api_url: lookup("EXAM_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            api_token: lookup("EXAM_API_TOKEN"),
            exam_id: ExamId::new(1),
            time_limit: TimeLimit::default(),
            email: lookup("EXAM_USER_EMAIL"),
            role: Role::Student,
            demo: lookup("EXAM_DEMO").is_some_and(|value| value == "1"),
        };
        if let Some(raw) = lookup("EXAM_ID") {
            args.exam_id = raw.parse().map_err(|_| ArgsError::InvalidEnv {
                key: "EXAM_ID",
                raw: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("EXAM_TIME_LIMIT") {
            args.time_limit =
                TimeLimit::parse(Some(&raw)).map_err(|_| ArgsError::InvalidEnv {
                    key: "EXAM_TIME_LIMIT",
                    raw: raw.clone(),
                })?;
        }
        if let Some(raw) = lookup("EXAM_USER_ROLE") {
            args.role = raw.parse().map_err(|_| ArgsError::InvalidEnv {
                key: "EXAM_USER_ROLE",
                raw: raw.clone(),
            })?;
        }
        Ok(args)
    }

    fn parse(
        mut self,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Option<Self>, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => {
                    let value = require_value(args, "--api-url")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    self.api_url = value;
                }
                "--api-token" => {
                    self.api_token = Some(require_value(args, "--api-token")?);
                }
                "--exam-id" => {
                    let value = require_value(args, "--exam-id")?;
                    self.exam_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidExamId { raw: value.clone() })?;
                }
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    self.time_limit = TimeLimit::parse(Some(&value))
                        .map_err(|_| ArgsError::InvalidTimeLimit { raw: value.clone() })?;
                }
                "--email" => {
                    self.email = Some(require_value(args, "--email")?);
                }
                "--role" => {
                    let value = require_value(args, "--role")?;
                    self.role = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidRole { raw: value.clone() })?;
                }
                "--demo" => self.demo = true,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Some(self))
    }

    fn identity(&self) -> Option<SessionContext> {
        self.email
            .as_deref()
            .and_then(|email| SessionContext::new(email, self.role))
    }

    fn exams(&self) -> Vec<ExamListing> {
        let title = if self.demo {
            "Sample Exam".to_string()
        } else {
            format!("Exam #{}", self.exam_id)
        };
        vec![ExamListing::new(self.exam_id, title, self.time_limit)]
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Ignored when a subscriber is already installed.
    let _ = log_fmt().with_env_filter(filter).with_target(false).try_init();
}

fn build_services(args: &Args) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = Clock::default_clock();
    if args.demo {
        info!("using the in-memory demo backend");
        return Ok(AppServices::in_memory(
            Arc::new(InMemoryExamApi::sample()),
            clock,
        ));
    }

    let config = ExamApiConfig::new(args.api_url.clone()).with_token(args.api_token.clone());
    let services = AppServices::http(config, clock)?;
    info!(api_url = %args.api_url, "using the exam backend");
    Ok(services)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::from_lookup(|key| std::env::var(key).ok())
        .and_then(|args| args.parse(&mut argv))
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;
    let Some(args) = parsed else {
        print_usage();
        return Ok(());
    };

    init_tracing();
    let services = build_services(&args)?;

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        services,
        identity: args.identity(),
        exams: args.exams(),
    });
    let context = build_app_context(&app);

    // Keep the exam window a normal window; some tao setups pin it on top.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Online Exam")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(ToString::to_string).collect::<Vec<_>>().into_iter()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_env_or_flags() {
        let parsed = Args::from_lookup(no_env).unwrap().parse(&mut args(&[])).unwrap().unwrap();
        assert_eq!(parsed.api_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.exam_id, ExamId::new(1));
        assert_eq!(parsed.time_limit.total_seconds(), 30 * 60);
        assert!(!parsed.demo);
        assert_eq!(parsed.identity(), None);
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            "EXAM_ID" => Some("4".to_string()),
            "EXAM_USER_ROLE" => Some("admin".to_string()),
            "EXAM_DEMO" => Some("1".to_string()),
            _ => None,
        };
        let parsed = Args::from_lookup(env)
            .unwrap()
            .parse(&mut args(&["--exam-id", "9", "--email", "a@b.c", "--time-limit", "45"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.exam_id, ExamId::new(9));
        assert_eq!(parsed.time_limit.total_seconds(), 45 * 60);
        assert!(parsed.demo);
        assert_eq!(parsed.identity().map(|who| who.role()), Some(Role::Admin));
        assert_eq!(parsed.exams()[0].title, "Sample Exam");
    }

    #[test]
    fn rejects_bad_values() {
        let err = Args::from_lookup(no_env)
            .unwrap()
            .parse(&mut args(&["--time-limit", "0"]))
            .unwrap_err();
        assert!(matches!(err, ArgsError::InvalidTimeLimit { .. }));

        let err = Args::from_lookup(no_env)
            .unwrap()
            .parse(&mut args(&["--role", "guest"]))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid --role value: guest");

        let err = Args::from_lookup(no_env).unwrap().parse(&mut args(&["--exam-id"])).unwrap_err();
        assert!(matches!(err, ArgsError::MissingValue { flag: "--exam-id" }));
    }

    #[test]
    fn invalid_env_values_are_rejected_like_flags() {
        for (key, raw) in [
            ("EXAM_ID", "abc"),
            ("EXAM_TIME_LIMIT", "0"),
            ("EXAM_TIME_LIMIT", "soon"),
            ("EXAM_USER_ROLE", "guest"),
        ] {
            let env = |name: &str| (name == key).then(|| raw.to_string());
            let err = Args::from_lookup(env).unwrap_err();
            assert_eq!(err.to_string(), format!("invalid {key} value: {raw}"));
        }
    }

    #[test]
    fn fractional_time_limit_from_env() {
        let env = |key: &str| (key == "EXAM_TIME_LIMIT").then(|| "1.5".to_string());
        let parsed = Args::from_lookup(env).unwrap();
        assert_eq!(parsed.time_limit.total_seconds(), 90);
    }

    #[test]
    fn help_short_circuits() {
        assert!(Args::from_lookup(no_env).unwrap().parse(&mut args(&["--help"])).unwrap().is_none());
    }
}
