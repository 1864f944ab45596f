use crate::service::catalog::StarsPackage;

/// Where a user is inside the purchase flow or the admin card flow.
/// No entry in the store means no flow is in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversationState {
    WaitingUsername {
        current_order: StarsPackage,
    },
    WaitingPayment {
        current_order: StarsPackage,
        telegram_username: String,
    },
    AddNewCard,
    ChangeCard,
}

impl ConversationState {
    pub fn step(&self) -> &'static str {
        match self {
            ConversationState::WaitingUsername { .. } => "waiting_username",
            ConversationState::WaitingPayment { .. } => "waiting_payment",
            ConversationState::AddNewCard => "add_new_card",
            ConversationState::ChangeCard => "change_card",
        }
    }
}
