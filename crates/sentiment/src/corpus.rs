//! Labeled training data.

use serde::{Deserialize, Serialize};

use crate::label::SentimentLabel;

/// One labeled review text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub label: SentimentLabel,
}

impl LabeledExample {
    pub fn new(text: impl Into<String>, label: SentimentLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Ordered snapshot of labeled examples a model is trained from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingCorpus {
    examples: Vec<LabeledExample>,
}

impl TrainingCorpus {
    pub fn new(examples: Vec<LabeledExample>) -> Self {
        Self { examples }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, SentimentLabel)>,
    {
        Self::new(pairs.into_iter().map(|(t, l)| LabeledExample::new(t, l)).collect())
    }

    /// Curated storefront reviews shipped with the service.
    pub fn seed() -> Self {
        use SentimentLabel::*;

        let positive = SEED_POSITIVE.iter().map(|t| (*t, Positive));
        let negative = SEED_NEGATIVE.iter().map(|t| (*t, Negative));
        let neutral = SEED_NEUTRAL.iter().chain(SEED_MIXED).map(|t| (*t, Neutral));
        Self::from_pairs(positive.chain(negative).chain(neutral))
    }

    /// Return a new corpus with `examples` appended.
    pub fn with_examples(mut self, examples: impl IntoIterator<Item = LabeledExample>) -> Self {
        self.examples.extend(examples);
        self
    }

    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledExample> {
        self.examples.iter()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn count(&self, label: SentimentLabel) -> usize {
        self.examples.iter().filter(|e| e.label == label).count()
    }
}

impl FromIterator<LabeledExample> for TrainingCorpus {
    fn from_iter<T: IntoIterator<Item = LabeledExample>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

const SEED_POSITIVE: &[&str] = &[
    "Absolutely love this product, the quality is excellent!",
    "Great value for the price, works perfectly every day.",
    "Excellent build quality and fast shipping, highly recommend.",
    "Works perfectly, exactly as described. Very happy with it.",
    "Best purchase I have made this year, great product!",
    "The quality is amazing and it arrived quickly. Love it!",
    "Highly recommend this seller, excellent customer service.",
    "Fantastic product, my whole family loves it.",
    "Very happy with the purchase, great quality and great price.",
    "Amazing value, works better than expected!",
    "Beautiful design and excellent quality materials.",
    "Perfect fit and very comfortable, love the color.",
    "Super fast delivery and the product works great.",
    "Exceeded my expectations, excellent value for money.",
    "Really impressed with the quality, will buy again!",
    "Great product, easy to use and very reliable.",
    "Wonderful item, arrived well packaged and works perfectly.",
    "The best one I have owned, highly recommend it to everyone.",
    "Fantastic quality, the price was great too.",
    "Love it! Easy setup and excellent performance.",
];

const SEED_NEGATIVE: &[&str] = &[
    "Terrible quality, it broke after one day.",
    "Complete waste of money, does not work at all.",
    "Very disappointed, the product arrived damaged.",
    "Poor quality materials, broke within a week.",
    "Worst purchase ever, would not recommend to anyone.",
    "Stopped working after two days, terrible product.",
    "Awful customer service and the item never worked.",
    "Cheap and flimsy, a total waste of money.",
    "Arrived broken and the seller refused a refund.",
    "Very poor quality, nothing like the description.",
    "Disappointed with this purchase, it broke immediately.",
    "Terrible experience, the product is useless.",
    "Do not buy this, poor build and awful support.",
    "The battery died after a week, very disappointed.",
    "Horrible quality, returned it the same day.",
    "Broke the first time I used it, cheap junk.",
    "Not worth the money, poor performance and slow.",
    "Useless product, stopped working immediately.",
    "Defective item and terrible packaging, very disappointed.",
    "Awful, the worst quality I have seen, waste of money.",
];

const SEED_NEUTRAL: &[&str] = &[
    "The product is okay, nothing special.",
    "It works as expected, average quality.",
    "Decent product for the price, does the job.",
    "It is fine, arrived on time.",
    "Average quality, works okay for basic use.",
    "Does what it says, nothing more and nothing less.",
    "Okay product, the delivery was on time.",
    "It is an average item, does the job.",
    "Standard quality, works as described.",
    "Fine for the price, nothing special about it.",
    "The item is decent, typical for this price range.",
    "Works okay, average performance overall.",
    "It does the job, fairly standard product.",
    "Arrived as described, average build.",
    "Reasonable product, works as expected for now.",
];

const SEED_MIXED: &[&str] = &[
    "Good quality but the delivery was slow.",
    "Nice design but the battery life is average.",
    "Works well but the price is a bit high.",
    "Great features but the setup was confusing.",
    "Decent product but customer service was slow to respond.",
];
