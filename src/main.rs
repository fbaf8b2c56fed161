use moonstone::{
    init_logger, install_root, AppConfig, BundleUpdater, CommandExecutor, ConfigurationFile,
    ConsoleTray, ControlFlow, GithubReleaseFeed, Notifier, ScBackend, SchtasksAutostart,
    ServiceController, SessionStore, TrayDeps, TrayNotifier, TrayOrchestrator,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let root = install_root()?;
    let config = Arc::new(AppConfig::load(&root)?);

    // 初始化日志系统
    if let Err(e) = init_logger(&config.log) {
        eprintln!("Failed to initialize logging: {e}");
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        root = %root.display(),
        "Moonstone 启动"
    );
    if let Some(path) = &config.overrides_file {
        tracing::info!(path = %path.display(), "已加载覆盖配置");
    }

    if !config.paths.icon.exists() {
        tracing::warn!(icon = %config.paths.icon.display(), "托盘图标不存在");
    }

    let profiles = ConfigurationFile::discover(&config.paths.config_dir)?;
    if profiles.is_empty() {
        tracing::error!(dir = %config.paths.config_dir.display(), "未找到任何 .bat 配置");
        anyhow::bail!(
            "未在 {} 中找到 .bat 配置文件",
            config.paths.config_dir.display()
        );
    }

    let executor = CommandExecutor::new(config.script_encoding);
    let backend = Arc::new(ScBackend::new(executor.clone()));
    let controller = Arc::new(ServiceController::new(config.clone(), backend));

    let menu = Arc::new(ConsoleTray::new());
    let notifier: Arc<dyn Notifier> = Arc::new(TrayNotifier::new(menu.clone()));
    let feed = Arc::new(GithubReleaseFeed::new(&config.updater)?);
    let updater = Arc::new(BundleUpdater::new(
        config.clone(),
        feed,
        controller.clone(),
        notifier.clone(),
    ));
    let autostart = Arc::new(SchtasksAutostart::new(
        executor.clone(),
        config.autostart_task_name.clone(),
        std::env::current_exe()?,
    ));

    let orchestrator = TrayOrchestrator::new(TrayDeps {
        config: config.clone(),
        profiles,
        controller,
        updater,
        session: SessionStore::new(&config.paths.state_file),
        autostart,
        menu: menu.clone(),
        notifier,
        executor,
    });
    orchestrator.initialize().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", menu.render());
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            // 标准输入关闭时按退出处理
            orchestrator.shutdown().await;
            break;
        };

        match menu.parse_choice(&line) {
            Some(action) => {
                if orchestrator.handle(action).await == ControlFlow::Exit {
                    break;
                }
            }
            None => println!("无效选项: {}", line.trim()),
        }
    }

    tracing::info!("Moonstone 已退出");
    Ok(())
}
