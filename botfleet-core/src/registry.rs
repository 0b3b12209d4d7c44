//! Active bot handles in creation order.
//!
//! New bots go on the tail and shrinking pops from the tail, so the
//! earliest bots keep their sessions for as long as the fleet exists.

use crate::bot::Bot;

#[derive(Debug)]
pub struct Registry<B> {
    bots: Vec<B>,
}

impl<B> Default for Registry<B> {
    fn default() -> Self {
        Self { bots: Vec::new() }
    }
}

impl<B: Bot> Registry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bot: B) {
        self.bots.push(bot);
    }

    /// Remove the most recently created bot.
    pub fn pop(&mut self) -> Option<B> {
        self.bots.pop()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, B> {
        self.bots.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, B> {
        self.bots.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&B> {
        self.bots.iter().find(|b| b.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Nicknames in creation order.
    pub fn names(&self) -> Vec<String> {
        self.bots.iter().map(|b| b.name().to_string()).collect()
    }

    pub fn online_count(&self) -> usize {
        self.bots.iter().filter(|b| b.is_online()).count()
    }
}

impl<'a, B: Bot> IntoIterator for &'a Registry<B> {
    type Item = &'a B;
    type IntoIter = std::slice::Iter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
