use std::borrow::Cow;

use crate::{
    service::catalog::{Catalog, StarsPackage},
    transport::{InlineButton, Menu},
};

pub const ADD_NEW_CARD: &str = "add_new_card";
pub const CHANGE_CARD: &str = "change_card";

/// Reply-keyboard buttons. A press comes back as a text message carrying the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    BuyStars,
    Profile,
    Support,
    Statistics,
    Orders,
    Users,
}

impl MenuAction {
    const ALL: [MenuAction; 6] = [
        MenuAction::BuyStars,
        MenuAction::Profile,
        MenuAction::Support,
        MenuAction::Statistics,
        MenuAction::Orders,
        MenuAction::Users,
    ];

    fn i18n_key(&self) -> &'static str {
        match self {
            MenuAction::BuyStars => "buttons.user.buy",
            MenuAction::Profile => "buttons.user.profile",
            MenuAction::Support => "buttons.user.support",
            MenuAction::Statistics => "buttons.admin.stats",
            MenuAction::Orders => "buttons.admin.orders",
            MenuAction::Users => "buttons.admin.users",
        }
    }

    pub fn label(&self) -> Cow<'static, str> {
        t!(self.i18n_key())
    }

    pub fn from_text(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.label() == text)
    }

    pub fn is_admin_only(&self) -> bool {
        matches!(self, MenuAction::Statistics | MenuAction::Orders | MenuAction::Users)
    }
}

fn reply_rows(rows: &[&[MenuAction]]) -> Menu {
    Menu::Reply(
        rows.iter()
            .map(|row| row.iter().map(|action| action.label().into_owned()).collect())
            .collect(),
    )
}

pub fn get_user_menu() -> Menu {
    reply_rows(&[
        &[MenuAction::BuyStars, MenuAction::Profile],
        &[MenuAction::Support],
    ])
}

pub fn get_admin_menu() -> Menu {
    reply_rows(&[
        &[MenuAction::Statistics, MenuAction::Orders],
        &[MenuAction::Users],
    ])
}

pub fn package_label(package: &StarsPackage) -> String {
    let mut label = t!("buttons.package", amount = package.amount, price = package.price).into_owned();

    if package.discount > 0 {
        label.push_str(&t!("buttons.package_discount", discount = package.discount));
    }

    label
}

pub fn get_packages_menu(catalog: &Catalog) -> Menu {
    Menu::Inline(
        catalog
            .packages()
            .iter()
            .map(|package| vec![InlineButton::new(package_label(package), package.key())])
            .collect(),
    )
}

/// Offers to add a card when none is stored yet, otherwise to change it.
pub fn get_card_menu(has_stored_card: bool) -> Menu {
    let button = if has_stored_card {
        InlineButton::new(t!("buttons.card.change"), CHANGE_CARD)
    } else {
        InlineButton::new(t!("buttons.card.add"), ADD_NEW_CARD)
    };

    Menu::Inline(vec![vec![button]])
}
