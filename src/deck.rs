#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardItem {
    pub id: String,
    pub image: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
}

impl CardItem {
    pub fn from_image(id: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            title: None,
            subtitle: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Advanced { consumed: usize },
    AlreadyExhausted,
}

/// Ordered cards plus a consumption cursor. Cards below the cursor are
/// consumed and only come back through [`Deck::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    items: Vec<CardItem>,
    cursor: usize,
}

impl Deck {
    pub fn new(items: Vec<CardItem>) -> Self {
        Self { items, cursor: 0 }
    }

    pub fn items(&self) -> &[CardItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.items.len()
    }

    pub fn top_card(&self) -> Option<&CardItem> {
        self.items.get(self.cursor)
    }

    pub fn advance(&mut self) -> Advance {
        if self.cursor < self.items.len() {
            let consumed = self.cursor;
            self.cursor += 1;
            Advance::Advanced { consumed }
        } else {
            Advance::AlreadyExhausted
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Unconsumed cards with their depth below the top of the stack.
    pub fn visible(&self) -> impl Iterator<Item = (usize, usize, &CardItem)> + '_ {
        let cursor = self.cursor;
        self.items
            .iter()
            .enumerate()
            .skip(cursor)
            .map(move |(index, item)| (index, index - cursor, item))
    }
}
