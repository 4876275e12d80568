use env_logger::{Builder, Env};
use std::io::Write;

/// Инициализация логгера: вся диагностика уходит в stderr,
/// stdout остаётся за единственным JSON-результатом.
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", "warn,voxmix=info");

    Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
