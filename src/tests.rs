use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId, UserId};

use crate::{
    command::Command,
    error::BotResult,
    event::{Event, Sender},
    handler::{
        handle_event,
        keyboard::{get_admin_menu, get_card_menu, get_user_menu},
    },
    service::{auth::StaticAdmins, catalog::Catalog, conversation::ConversationState, ServiceRegistry},
    state::AppState,
    storage::{MemoryStore, RecordStore, StorageManager},
    transport::{Menu, Presenter},
};

const ADMIN: UserId = UserId(1);
const BUYER: UserId = UserId(77);

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Text { body: String, menu: Option<Menu> },
    Edit { message_id: MessageId, body: String },
    Answer { callback_id: String },
}

#[derive(Default)]
struct RecordingPresenter {
    sent: Mutex<Vec<Sent>>,
    reject_answers: bool,
}

impl RecordingPresenter {
    /// Telegram refuses to answer stale callback queries.
    fn rejecting_answers() -> Self {
        Self {
            reject_answers: true,
            ..Default::default()
        }
    }

    fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    fn last_text(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|sent| match sent {
                Sent::Text { body, .. } | Sent::Edit { body, .. } => Some(body.clone()),
                Sent::Answer { .. } => None,
            })
            .expect("nothing was sent")
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn send_text(&self, _chat_id: ChatId, body: &str, menu: Option<Menu>) -> BotResult<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            body: body.to_string(),
            menu,
        });
        Ok(())
    }

    async fn edit_text(&self, _chat_id: ChatId, message_id: MessageId, body: &str) -> BotResult<()> {
        self.sent.lock().unwrap().push(Sent::Edit {
            message_id,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, _text: Option<&str>) -> BotResult<()> {
        if self.reject_answers {
            return Err(anyhow::anyhow!("Bad Request: query is too old").into());
        }
        self.sent.lock().unwrap().push(Sent::Answer {
            callback_id: callback_id.to_string(),
        });
        Ok(())
    }
}

fn app_with(storage: StorageManager) -> AppState {
    AppState {
        storage: storage.clone(),
        service_registry: ServiceRegistry::with_parts(Arc::new(StaticAdmins::new([ADMIN])), storage),
        support_username: "@kamron201".to_string(),
    }
}

fn memory_app() -> (AppState, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let storage = StorageManager::with_backend(backend.clone(), Duration::from_secs(1));
    (app_with(storage), backend)
}

fn sender(id: UserId) -> Sender {
    Sender {
        id,
        username: Some(format!("user{}", id.0)),
        first_name: "Kamron".to_string(),
    }
}

fn chat(id: UserId) -> ChatId {
    ChatId(id.0 as i64)
}

fn command(id: UserId, command: Command) -> Event {
    Event::Command {
        command,
        sender: sender(id),
        chat_id: chat(id),
    }
}

fn text(id: UserId, body: &str) -> Event {
    Event::Text {
        body: body.to_string(),
        sender: sender(id),
        chat_id: chat(id),
    }
}

fn photo(id: UserId) -> Event {
    Event::Photo {
        sender: sender(id),
        chat_id: chat(id),
    }
}

fn callback(id: UserId, data: &str) -> Event {
    Event::Callback {
        callback_id: format!("cb-{}", data),
        data: data.to_string(),
        sender: sender(id),
        chat_id: chat(id),
        message_id: MessageId(10),
    }
}

#[tokio::test]
async fn test_purchase_flow_creates_pending_order() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();
    let conversation = &app.service_registry.conversation;

    handle_event(&app, &presenter, callback(BUYER, "buy_100")).await;

    let package = Catalog::default().get("buy_100").unwrap();
    assert_eq!(
        conversation.get(BUYER),
        Some(ConversationState::WaitingUsername { current_order: package })
    );
    let sent = presenter.take();
    assert!(matches!(&sent[0], Sent::Edit { message_id, body } if *message_id == MessageId(10) && body.contains("100 Stars")));
    assert_eq!(
        sent[1],
        Sent::Answer {
            callback_id: "cb-buy_100".to_string()
        }
    );

    handle_event(&app, &presenter, text(BUYER, "  @myhandle ")).await;

    assert_eq!(
        conversation.get(BUYER),
        Some(ConversationState::WaitingPayment {
            current_order: package,
            telegram_username: "myhandle".to_string(),
        })
    );
    let instructions = presenter.last_text();
    assert!(instructions.contains("@myhandle"));
    assert!(instructions.contains("2202 2002 2020 2020"));

    handle_event(&app, &presenter, photo(BUYER)).await;

    assert_eq!(conversation.get(BUYER), None);

    let orders = app.service_registry.order.list_recent(10).await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.user_id, BUYER.0);
    assert_eq!(order.telegram_username, "myhandle");
    assert_eq!(order.username, "user77");
    assert_eq!((order.stars_amount, order.price, order.points), (100, 160, 2));
    assert_eq!(order.status, crate::service::order::OrderStatus::Pending);

    assert!(presenter.last_text().contains(&format!("#{}", order.order_id)));
}

#[tokio::test]
async fn test_invalid_handle_reprompts() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, callback(BUYER, "buy_50")).await;
    handle_event(&app, &presenter, text(BUYER, "a;drop")).await;

    assert_eq!(presenter.last_text(), t!("username.invalid"));
    assert!(matches!(
        app.service_registry.conversation.get(BUYER),
        Some(ConversationState::WaitingUsername { .. })
    ));

    // only '@' characters: nothing left after stripping
    handle_event(&app, &presenter, text(BUYER, "@@")).await;
    assert_eq!(presenter.last_text(), t!("username.invalid"));

    // the '@' counts towards the length limit
    handle_event(&app, &presenter, text(BUYER, &format!("@{}", "a".repeat(100)))).await;
    assert_eq!(presenter.last_text(), t!("username.invalid"));
    assert!(matches!(
        app.service_registry.conversation.get(BUYER),
        Some(ConversationState::WaitingUsername { .. })
    ));

    handle_event(&app, &presenter, text(BUYER, &format!("@{}", "a".repeat(99)))).await;
    assert!(matches!(
        app.service_registry.conversation.get(BUYER),
        Some(ConversationState::WaitingPayment { .. })
    ));
}

#[tokio::test]
async fn test_rejected_answer_keeps_selection() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::rejecting_answers();

    handle_event(&app, &presenter, callback(BUYER, "buy_100")).await;

    let package = Catalog::default().get("buy_100").unwrap();
    assert_eq!(
        app.service_registry.conversation.get(BUYER),
        Some(ConversationState::WaitingUsername { current_order: package })
    );
    assert_ne!(presenter.last_text(), t!("errors.generic"));
    assert!(presenter.last_text().contains("100 Stars"));
}

#[tokio::test]
async fn test_new_selection_overwrites_flow() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, callback(BUYER, "buy_50")).await;
    handle_event(&app, &presenter, text(BUYER, "first")).await;
    handle_event(&app, &presenter, callback(BUYER, "buy_1000")).await;

    let package = Catalog::default().get("buy_1000").unwrap();
    assert_eq!(
        app.service_registry.conversation.get(BUYER),
        Some(ConversationState::WaitingUsername { current_order: package })
    );
}

#[tokio::test]
async fn test_unknown_package_edits_error() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, callback(BUYER, "buy_42")).await;

    assert_eq!(presenter.last_text(), t!("packages.unknown"));
    assert_eq!(app.service_registry.conversation.get(BUYER), None);
}

#[tokio::test]
async fn test_cancel_replies_depend_on_state() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, command(BUYER, Command::Cancel)).await;
    assert_eq!(presenter.last_text(), t!("cancel.nothing"));

    handle_event(&app, &presenter, callback(BUYER, "buy_75")).await;
    handle_event(&app, &presenter, command(BUYER, Command::Cancel)).await;

    assert_eq!(presenter.last_text(), t!("cancel.cancelled"));
    assert_eq!(app.service_registry.conversation.get(BUYER), None);
}

#[tokio::test]
async fn test_ignored_inputs() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    // photo with no flow, text with no flow
    handle_event(&app, &presenter, photo(BUYER)).await;
    handle_event(&app, &presenter, text(BUYER, "salom")).await;
    assert!(presenter.take().is_empty());

    handle_event(&app, &presenter, callback(BUYER, "buy_50")).await;
    handle_event(&app, &presenter, text(BUYER, "myhandle")).await;
    presenter.take();

    // text while waiting for the payment photo
    handle_event(&app, &presenter, text(BUYER, "where is my order?")).await;
    assert!(presenter.take().is_empty());
    assert!(matches!(
        app.service_registry.conversation.get(BUYER),
        Some(ConversationState::WaitingPayment { .. })
    ));
    assert_eq!(app.service_registry.order.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_menu_takes_precedence_over_flow() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, callback(BUYER, "buy_250")).await;
    handle_event(&app, &presenter, text(BUYER, "👤 Profil")).await;

    assert!(presenter.last_text().contains(&*t!("profile.level.bronze")));
    assert!(matches!(
        app.service_registry.conversation.get(BUYER),
        Some(ConversationState::WaitingUsername { .. })
    ));

    handle_event(&app, &presenter, text(BUYER, "🆘 Yordam")).await;
    assert!(presenter.last_text().contains("@kamron201"));

    handle_event(&app, &presenter, text(BUYER, "🛒 Stars sotib olish")).await;
    match presenter.take().pop() {
        Some(Sent::Text { menu: Some(Menu::Inline(rows)), .. }) => assert_eq!(rows.len(), 7),
        other => panic!("expected the package menu, got {:?}", other),
    }
}

#[tokio::test]
async fn test_start_menu_depends_on_role() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, command(BUYER, Command::Start)).await;
    match presenter.take().pop() {
        Some(Sent::Text { body, menu }) => {
            assert!(body.contains("Kamron"));
            assert_eq!(menu, Some(get_user_menu()));
        }
        other => panic!("unexpected {:?}", other),
    }

    handle_event(&app, &presenter, command(ADMIN, Command::Start)).await;
    match presenter.take().pop() {
        Some(Sent::Text { menu, .. }) => assert_eq!(menu, Some(get_admin_menu())),
        other => panic!("unexpected {:?}", other),
    }

    let profile = app.service_registry.profile.get_or_create(BUYER).await.unwrap();
    assert_eq!(profile.first_name, "Kamron");
    assert_eq!(profile.username, "user77");
    assert_eq!(app.service_registry.profile.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_welcome_escapes_name() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    let event = Event::Command {
        command: Command::Start,
        sender: Sender {
            id: BUYER,
            username: None,
            first_name: "<b>x</b>".to_string(),
        },
        chat_id: chat(BUYER),
    };
    handle_event(&app, &presenter, event).await;

    assert!(presenter.last_text().contains("&lt;b&gt;x&lt;/b&gt;"));
}

#[tokio::test]
async fn test_admin_card_flow() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();
    let orders = &app.service_registry.order;

    handle_event(&app, &presenter, command(ADMIN, Command::Card)).await;
    match presenter.take().pop() {
        Some(Sent::Text { body, menu }) => {
            assert!(body.contains("2202 2002 2020 2020"));
            assert_eq!(menu, Some(get_card_menu(false)));
        }
        other => panic!("unexpected {:?}", other),
    }

    handle_event(&app, &presenter, callback(ADMIN, "add_new_card")).await;
    assert_eq!(
        app.service_registry.conversation.get(ADMIN),
        Some(ConversationState::AddNewCard)
    );

    handle_event(&app, &presenter, text(ADMIN, "1234")).await;
    assert_eq!(presenter.last_text(), t!("admin.card.invalid"));
    assert_eq!(orders.stored_payment_card().await.unwrap(), None);
    assert_eq!(
        app.service_registry.conversation.get(ADMIN),
        Some(ConversationState::AddNewCard)
    );

    handle_event(&app, &presenter, text(ADMIN, "8600 1234 5678 9012")).await;
    assert_eq!(
        orders.stored_payment_card().await.unwrap().as_deref(),
        Some("8600123456789012")
    );
    assert_eq!(app.service_registry.conversation.get(ADMIN), None);
    assert!(presenter.last_text().contains("8600 1234 5678 9012"));

    handle_event(&app, &presenter, command(ADMIN, Command::Card)).await;
    match presenter.take().pop() {
        Some(Sent::Text { menu, .. }) => assert_eq!(menu, Some(get_card_menu(true))),
        other => panic!("unexpected {:?}", other),
    }

    handle_event(&app, &presenter, callback(ADMIN, "change_card")).await;
    assert_eq!(
        app.service_registry.conversation.get(ADMIN),
        Some(ConversationState::ChangeCard)
    );
}

#[tokio::test]
async fn test_buyers_still_see_default_card() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    app.service_registry
        .order
        .set_payment_card("8600123456789012")
        .await
        .unwrap();

    handle_event(&app, &presenter, callback(BUYER, "buy_50")).await;
    handle_event(&app, &presenter, text(BUYER, "myhandle")).await;

    let instructions = presenter.last_text();
    assert!(instructions.contains("2202 2002 2020 2020"));
    assert!(!instructions.contains("8600"));
}

#[tokio::test]
async fn test_admin_features_are_gated() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, text(BUYER, "📊 Statistika")).await;
    handle_event(&app, &presenter, text(BUYER, "👥 Foydalanuvchilar")).await;
    handle_event(&app, &presenter, command(BUYER, Command::Card)).await;
    assert!(presenter.take().is_empty());

    handle_event(&app, &presenter, callback(BUYER, "add_new_card")).await;
    assert_eq!(
        presenter.take(),
        vec![Sent::Answer {
            callback_id: "cb-add_new_card".to_string()
        }]
    );
    assert_eq!(app.service_registry.conversation.get(BUYER), None);
}

#[tokio::test]
async fn test_admin_reports() {
    let (app, _) = memory_app();
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, text(ADMIN, "📦 Buyurtmalar")).await;
    assert_eq!(presenter.last_text(), t!("admin.orders.empty"));

    handle_event(&app, &presenter, command(BUYER, Command::Start)).await;

    for data in ["buy_100", "buy_500"] {
        handle_event(&app, &presenter, callback(BUYER, data)).await;
        handle_event(&app, &presenter, text(BUYER, "myhandle")).await;
        handle_event(&app, &presenter, photo(BUYER)).await;
    }
    let order_count = app.service_registry.order.count().await.unwrap();

    handle_event(&app, &presenter, text(ADMIN, "📊 Statistika")).await;
    let stats = presenter.last_text();
    if order_count == 2 {
        assert!(stats.contains("600"));
        assert!(stats.contains("940"));
    }

    handle_event(&app, &presenter, text(ADMIN, "📦 Buyurtmalar")).await;
    assert!(presenter.last_text().contains("@myhandle"));

    handle_event(&app, &presenter, text(ADMIN, "👥 Foydalanuvchilar")).await;
    assert!(presenter.last_text().contains("<code>77</code>"));
}

#[tokio::test]
async fn test_unavailable_store_degrades() {
    let app = app_with(StorageManager::unavailable());
    let presenter = RecordingPresenter::default();

    handle_event(&app, &presenter, command(BUYER, Command::Start)).await;
    handle_event(&app, &presenter, text(BUYER, "👤 Profil")).await;
    assert!(presenter.last_text().contains(&*t!("profile.level.bronze")));

    let profile = app.service_registry.profile.get_or_create(BUYER).await.unwrap();
    assert_eq!(profile.total_stars, 0);
    assert_eq!(profile.first_name, "");

    handle_event(&app, &presenter, callback(BUYER, "buy_100")).await;
    handle_event(&app, &presenter, text(BUYER, "myhandle")).await;
    handle_event(&app, &presenter, photo(BUYER)).await;

    assert!(presenter.last_text().contains("#ORD"));
    assert_eq!(app.service_registry.conversation.get(BUYER), None);
    assert_eq!(app.service_registry.order.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_failure_resets_flow_and_reports() {
    let (app, backend) = memory_app();
    let presenter = RecordingPresenter::default();

    backend
        .set(&format!("user:{}", BUYER.0), "not json".to_string(), None)
        .await
        .unwrap();

    handle_event(&app, &presenter, callback(BUYER, "buy_100")).await;
    handle_event(&app, &presenter, text(BUYER, "👤 Profil")).await;

    assert_eq!(presenter.last_text(), t!("errors.generic"));
    assert_eq!(app.service_registry.conversation.get(BUYER), None);
}
