//! Cooking mode: step-by-step playback of one recipe's instructions.
//!
//! The user controls pacing entirely; there is no auto-advance.

use crate::recipe::Recipe;

#[derive(Debug, Clone, PartialEq)]
pub struct CookingSession {
    recipe: Recipe,
    step: usize,
}

impl CookingSession {
    /// Enter cooking mode at the first step; `None` for a recipe with no steps
    pub fn start(recipe: Recipe) -> Option<Self> {
        if recipe.instructions.is_empty() {
            return None;
        }
        Some(Self { recipe, step: 0 })
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Zero-based index of the current step, always in `[0, N-1]`
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.recipe.instructions.len()
    }

    pub fn current_instruction(&self) -> &str {
        &self.recipe.instructions[self.step]
    }

    pub fn has_next(&self) -> bool {
        self.step + 1 < self.step_count()
    }

    pub fn has_previous(&self) -> bool {
        self.step > 0
    }

    /// Advance one step; returns false (and stays put) on the last step
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.step += 1;
        true
    }

    /// Go back one step; returns false (and stays put) on the first step
    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.step -= 1;
        true
    }

    /// Fraction of steps reached, for progress bars
    pub fn progress(&self) -> f32 {
        (self.step + 1) as f32 / self.step_count() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeDraft;

    fn session(steps: &[&str]) -> Option<CookingSession> {
        let mut recipe = RecipeDraft {
            title: "Omelette".into(),
            ..Default::default()
        }
        .into_recipe()
        .unwrap();
        recipe.instructions = steps.iter().map(|s| s.to_string()).collect();
        CookingSession::start(recipe)
    }

    #[test]
    fn starts_at_first_step() {
        let s = session(&["Whisk", "Cook", "Fold"]).unwrap();
        assert_eq!(s.step(), 0);
        assert_eq!(s.current_instruction(), "Whisk");
        assert!(!s.has_previous());
    }

    #[test]
    fn bounds_are_no_ops() {
        let mut s = session(&["Whisk", "Cook", "Fold"]).unwrap();
        assert!(!s.previous());
        assert_eq!(s.step(), 0);

        assert!(s.next());
        assert!(s.next());
        assert!(!s.next());
        assert_eq!(s.step(), 2);
        assert_eq!(s.current_instruction(), "Fold");

        assert!(s.previous());
        assert_eq!(s.step(), 1);
    }

    #[test]
    fn index_stays_in_range_under_any_sequence() {
        let mut s = session(&["a", "b", "c", "d"]).unwrap();
        for i in 0..50 {
            if i % 3 == 0 { s.previous() } else { s.next() };
            assert!(s.step() < s.step_count());
        }
    }

    #[test]
    fn single_step_recipe() {
        let mut s = session(&["Serve"]).unwrap();
        assert!(!s.next());
        assert!(!s.previous());
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn empty_recipe_cannot_be_cooked() {
        assert!(session(&[]).is_none());
    }
}
