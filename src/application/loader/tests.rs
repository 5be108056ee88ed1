use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{EventPayload, Message};
use crate::domain::traits::FilterInfo;
use crate::infrastructure::adapters::LocalClient;
use crate::infrastructure::config::Config;

struct Counting {
    hits: Arc<AtomicUsize>,
}

#[async_trait]
impl EventHandler for Counting {
    async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Named(&'static str);

impl Filter for Named {
    fn describe(&self) -> FilterInfo {
        FilterInfo {
            name: self.0.to_string(),
            description: String::new(),
            warning_key: format!("filters.{}.warning", self.0),
        }
    }

    fn apply(&self, _message: &Message) -> bool {
        false
    }
}

fn bot() -> (Arc<Bot>, Arc<LocalClient>) {
    let client = Arc::new(LocalClient::new());
    let bot = Arc::new(Bot::new(Config::default(), client.clone()));
    (bot, client)
}

type HandlerResult = Result<Arc<dyn EventHandler>, LoaderError>;

fn counting(
    hits: &Arc<AtomicUsize>,
) -> impl Fn(&Arc<Bot>) -> HandlerResult + Send + Sync + 'static {
    let hits = Arc::clone(hits);
    move |_bot: &Arc<Bot>| {
        let handler: Arc<dyn EventHandler> = Arc::new(Counting {
            hits: Arc::clone(&hits),
        });
        Ok(handler)
    }
}

#[tokio::test]
async fn test_duplicate_event_name_keeps_one_subscription() {
    let (bot, client) = bot();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let loader =
        ModuleLoader::new().with_event_source(StaticSource::new(["ready.yaml", "ready.json"]));
    loader.event_unit("ready", counting(&first));
    assert_eq!(loader.load_event_handlers(&bot).await.unwrap(), 2);
    assert_eq!(client.subscription_count("ready"), 1);

    // swap the factory and reload: still one subscription, new handler fires
    loader
        .replace_event_unit(&bot, "ready", counting(&second))
        .unwrap();
    assert_eq!(client.subscription_count("ready"), 1);

    client.emit("ready", EventPayload::Ready).await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_unit_is_skipped() {
    let (bot, client) = bot();
    let hits = Arc::new(AtomicUsize::new(0));

    let loader = ModuleLoader::new()
        .with_event_source(StaticSource::new(["broken.yaml", "unknown.yaml", "ready.yaml"]));
    loader.event_unit("broken", |_bot| {
        Err(LoaderError::Instantiate {
            unit: "broken".to_string(),
            reason: "missing token".to_string(),
        })
    });
    loader.event_unit("ready", counting(&hits));

    assert_eq!(loader.load_event_handlers(&bot).await.unwrap(), 1);
    assert_eq!(bot.event_names(), vec!["ready"]);
    assert_eq!(client.subscription_count("broken"), 0);
}

#[tokio::test]
async fn test_catalog_order_without_source() {
    let (bot, _client) = bot();
    let loader = ModuleLoader::new();
    loader.filter_unit("zeta", |_bot| Ok(Arc::new(Named("zeta")) as Arc<dyn Filter>));
    loader.filter_unit("alpha", |_bot| Ok(Arc::new(Named("alpha")) as Arc<dyn Filter>));

    assert_eq!(loader.load_filters(&bot).await.unwrap(), 2);
    let names: Vec<String> = bot.filters().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(bot.filters()[0].info.warning_key, "filters.zeta.warning");
}

#[tokio::test]
async fn test_filter_reinstall_keeps_position() {
    let (bot, _client) = bot();
    let loader = ModuleLoader::new()
        .with_filter_source(StaticSource::new(["a.yaml", "b.yaml", "a.yml"]));
    loader.filter_unit("a", |_bot| Ok(Arc::new(Named("a")) as Arc<dyn Filter>));
    loader.filter_unit("b", |_bot| Ok(Arc::new(Named("b")) as Arc<dyn Filter>));

    assert_eq!(loader.load_filters(&bot).await.unwrap(), 3);
    let names: Vec<String> = bot.filters().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn test_handler_errors_do_not_reach_emitter() {
    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        async fn execute(&self, _payload: EventPayload) -> Result<(), BotError> {
            Err(BotError::Platform("Gateway Time-out on GET /gateway".to_string()))
        }
    }

    let (bot, client) = bot();
    let loader = ModuleLoader::new();
    loader.event_unit("ready", |_bot| Ok(Arc::new(Failing) as Arc<dyn EventHandler>));
    loader.load_event_handlers(&bot).await.unwrap();

    // the guard swallows the error, so the emitter counts a completed run
    assert_eq!(client.emit("ready", EventPayload::Ready).await, 1);
}

#[tokio::test]
async fn test_shutdown_unsubscribes_everything() {
    let (bot, client) = bot();
    let hits = Arc::new(AtomicUsize::new(0));
    let loader = ModuleLoader::new();
    loader.event_unit("ready", counting(&hits));
    loader.event_unit("messageCreate", counting(&hits));
    loader.load_event_handlers(&bot).await.unwrap();

    bot.shutdown();
    assert_eq!(client.subscription_count("ready"), 0);
    assert_eq!(client.subscription_count("messageCreate"), 0);
    assert!(bot.event_handler("ready").is_none());
}
