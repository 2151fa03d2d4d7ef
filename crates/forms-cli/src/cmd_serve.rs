use forms_relay::RelayConfig;

pub fn execute(bind: &str, port: Option<u16>, trust_proxy: bool) -> anyhow::Result<()> {
    let mut config = RelayConfig::from_env();
    config.bind = bind.to_string();
    if let Some(port) = port {
        config.port = port;
    }
    config.trust_proxy |= trust_proxy;
    if config.api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set; summary requests will fail");
    }
    tokio::runtime::Runtime::new()?.block_on(forms_relay::serve(config))
}
