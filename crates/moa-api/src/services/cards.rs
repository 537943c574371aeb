use std::sync::Arc;

use moa_core::model::{Card, CardChanges, CardFilter, CardTotals, NewCard};
use moa_core::{CardId, Page, Paginated, Validate};
use moa_storage::{CardStore, Store};

use crate::error::{ApiError, Result};

/// Card lookups for users, plus the administrator operations the CLI drives.
#[derive(Clone)]
pub struct CardService {
    store: Arc<dyn Store>,
}

impl CardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Active cards, newest first, optionally of one activity type.
    pub async fn list_active(
        &self,
        activity_type: Option<String>,
        page: Page,
    ) -> Result<Paginated<Card>> {
        self.list(&CardFilter::active(activity_type), page).await
    }

    pub async fn list(&self, filter: &CardFilter, page: Page) -> Result<Paginated<Card>> {
        let items = self.store.list_cards(filter, page).await?;
        let total = self.store.count_cards(filter).await?;
        Ok(Paginated::new(items, total, page))
    }

    /// A card users may see; inactive cards look missing.
    pub async fn get_active(&self, id: CardId) -> Result<Card> {
        active_or_not_found(self.store.get_card(id).await?)
    }

    /// Resolve a scanned QR code to an active card.
    pub async fn scan(&self, qr_code: &str) -> Result<Card> {
        let card = active_or_not_found(self.store.get_card_by_qr(qr_code).await?)?;
        tracing::debug!(card_id = %card.id, "Scanned card");
        Ok(card)
    }

    pub async fn get(&self, id: CardId) -> Result<Card> {
        self.store
            .get_card(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Card not found"))
    }

    pub async fn get_detail(&self, id: CardId) -> Result<(Card, CardTotals)> {
        let card = self.get(id).await?;
        let totals = self.store.card_totals(id).await?;
        Ok((card, totals))
    }

    pub async fn create(&self, card: NewCard) -> Result<Card> {
        card.validate()?;
        let card = self.store.create_card(card).await?;
        tracing::info!(card_id = %card.id, qr_code = %card.qr_code, "Created card");
        Ok(card)
    }

    pub async fn update(&self, id: CardId, changes: CardChanges) -> Result<Card> {
        changes.validate()?;
        if changes.is_empty() {
            return self.get(id).await;
        }
        Ok(self.store.update_card(id, changes).await?)
    }

    pub async fn deactivate(&self, id: CardId) -> Result<()> {
        self.store.deactivate_card(id).await?;
        tracing::info!(card_id = %id, "Deactivated card");
        Ok(())
    }

    /// Remove the card with its activities and shares.
    pub async fn delete(&self, id: CardId) -> Result<()> {
        self.store.delete_card(id).await?;
        tracing::info!(card_id = %id, "Deleted card");
        Ok(())
    }
}

fn active_or_not_found(card: Option<Card>) -> Result<Card> {
    card.filter(|c| c.is_active)
        .ok_or_else(|| ApiError::not_found("Card not found"))
}
