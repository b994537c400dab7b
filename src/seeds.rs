//! Built-in question buckets and word lists.
//!
//! These guarantee the service is useful without configuration or a remote
//! model. Mathematics must stay non-empty: it is the bucket set used for
//! unknown subjects.

use std::collections::HashMap;

use crate::domain::{MultipleChoiceQuestion, QuestionBucket, WordEntry};

fn mcq(question: &str, options: [&str; 4], correct: &str, explanation: &str, difficulty: i64, category: &str) -> MultipleChoiceQuestion {
  MultipleChoiceQuestion {
    question: question.into(),
    options: options.iter().map(|o| o.to_string()).collect(),
    correct: correct.into(),
    explanation: explanation.into(),
    difficulty,
    category: category.into(),
  }
}

fn bucket(levels: &[i64], items: Vec<MultipleChoiceQuestion>) -> QuestionBucket {
  QuestionBucket { levels: levels.to_vec(), items }
}

/// Subject -> buckets, in table order (first match wins during selection).
pub fn seed_question_buckets() -> HashMap<String, Vec<QuestionBucket>> {
  let mut bank = HashMap::new();

  bank.insert("Mathematics".to_string(), vec![
    bucket(&[1, 2], vec![
      mcq("What is 3 + 4?", ["7", "6", "8", "5"], "7", "3 + 4 = 7", 1, "Basic Addition"),
      mcq("What is 9 - 5?", ["4", "3", "5", "6"], "4", "9 - 5 = 4", 2, "Basic Subtraction"),
      mcq("What is 2 + 2?", ["4", "3", "5", "6"], "4", "2 + 2 = 4", 1, "Basic Addition"),
      mcq("What is 10 - 3?", ["7", "6", "8", "5"], "7", "10 - 3 = 7", 2, "Basic Subtraction"),
    ]),
    bucket(&[3, 4, 5], vec![
      mcq("What is 6 × 7?", ["42", "41", "43", "40"], "42", "6 × 7 = 42", 4, "Multiplication"),
      mcq("What is 48 ÷ 6?", ["8", "7", "9", "6"], "8", "48 ÷ 6 = 8", 5, "Division"),
      mcq("What is 5 × 8?", ["40", "35", "45", "30"], "40", "5 × 8 = 40", 4, "Multiplication"),
      mcq("What is 36 ÷ 4?", ["9", "8", "10", "7"], "9", "36 ÷ 4 = 9", 5, "Division"),
    ]),
    bucket(&[6, 7, 8, 9], vec![
      mcq("What is 15% of 200?", ["30", "25", "35", "20"], "30", "15% of 200 = 0.15 × 200 = 30", 7, "Percentages"),
      mcq("If 2x + 5 = 13, what is x?", ["4", "3", "5", "6"], "4", "2x = 13 - 5 = 8, so x = 4", 8, "Algebra"),
      mcq("What is 25% of 80?", ["20", "15", "25", "30"], "20", "25% of 80 = 0.25 × 80 = 20", 7, "Percentages"),
      mcq("If 3x - 2 = 10, what is x?", ["4", "3", "5", "6"], "4", "3x = 10 + 2 = 12, so x = 4", 8, "Algebra"),
    ]),
    bucket(&[10, 11, 12, 13, 14, 15], vec![
      mcq("What is the derivative of x²?", ["2x", "x", "2", "x²"], "2x", "Using the power rule: d/dx(x²) = 2x", 12, "Calculus"),
      mcq("What is sin(90°)?", ["1", "0", "√2/2", "-1"], "1", "sin(90°) = 1 in the unit circle", 10, "Trigonometry"),
      mcq("What is the integral of 2x?", ["x² + C", "2x² + C", "x + C", "2 + C"], "x² + C", "∫2x dx = x² + C", 12, "Calculus"),
      mcq("What is cos(0°)?", ["1", "0", "√2/2", "-1"], "1", "cos(0°) = 1 in the unit circle", 10, "Trigonometry"),
    ]),
  ]);

  bank.insert("Science".to_string(), vec![
    bucket(&[1, 2, 3], vec![
      mcq("What do plants need to make food?", ["Sunlight", "Darkness", "Cold", "Noise"], "Sunlight",
        "Plants use sunlight in photosynthesis to make their own food", 2, "Biology"),
      mcq("How many legs does a spider have?", ["8", "6", "10", "4"], "8", "Spiders are arachnids and have 8 legs", 2, "Biology"),
    ]),
    bucket(&[4, 5, 6, 7], vec![
      mcq("What is the chemical symbol for water?", ["H2O", "CO2", "O2", "NaCl"], "H2O",
        "Water is composed of 2 hydrogen atoms and 1 oxygen atom", 5, "Chemistry"),
      mcq("What gas do plants release during photosynthesis?", ["Oxygen", "Carbon dioxide", "Nitrogen", "Hydrogen"], "Oxygen",
        "Plants release oxygen as a byproduct of photosynthesis", 6, "Biology"),
    ]),
  ]);

  bank.insert("History".to_string(), vec![
    bucket(&[1, 2, 3, 4], vec![
      mcq("Who was the first President of the United States?",
        ["George Washington", "Thomas Jefferson", "John Adams", "Benjamin Franklin"], "George Washington",
        "George Washington was the first President from 1789-1797", 3, "American History"),
    ]),
  ]);

  bank.insert("English".to_string(), vec![
    bucket(&[1, 2, 3, 4], vec![
      mcq("What is a noun?",
        ["A person, place, or thing", "An action word", "A describing word", "A connecting word"], "A person, place, or thing",
        "A noun is a word that names a person, place, or thing", 2, "Grammar"),
    ]),
  ]);

  bank
}

/// Served when the selected bucket is empty.
pub fn universal_fallback_question(difficulty: i64) -> MultipleChoiceQuestion {
  mcq("What is 1 + 1?", ["2", "1", "3", "0"], "2", "1 + 1 = 2", difficulty, "Basic Math")
}

const fn word(word: &'static str, definition: &'static str, category: &'static str) -> WordEntry {
  WordEntry { word, definition, category }
}

pub const WORDS_EASY: &[WordEntry] = &[
  word("CAT", "A small furry pet that meows", "Animals"),
  word("DOG", "A loyal pet that barks", "Animals"),
  word("SUN", "The bright star in our sky", "Nature"),
  word("TREE", "A tall plant with branches and leaves", "Nature"),
  word("BOOK", "Something you read with pages", "Objects"),
];

pub const WORDS_MEDIUM: &[WordEntry] = &[
  word("ELEPHANT", "Large gray animal with trunk", "Animals"),
  word("RAINBOW", "Colorful arc in the sky", "Nature"),
  word("COMPUTER", "Electronic device for work", "Technology"),
  word("BUTTERFLY", "Colorful flying insect", "Animals"),
  word("MOUNTAIN", "Very tall natural land formation", "Geography"),
];

pub const WORDS_HARD: &[WordEntry] = &[
  word("MAGNIFICENT", "Extremely beautiful or impressive", "Adjectives"),
  word("PHOTOSYNTHESIS", "Process plants use to make food from sunlight", "Science"),
  word("DEMOCRACY", "Government by the people", "Social Studies"),
  word("ECOSYSTEM", "Community of living and non-living things", "Science"),
  word("LITERATURE", "Written works of artistic value", "English"),
];

pub const WORDS_EXPERT: &[WordEntry] = &[
  word("SERENDIPITOUS", "Occurring by happy chance", "Advanced Vocabulary"),
  word("METAMORPHOSIS", "Complete change of form or nature", "Science"),
  word("JUXTAPOSITION", "Placing things side by side for contrast", "Literature"),
  word("QUINTESSENTIAL", "Most perfect example of a quality", "Advanced Vocabulary"),
  word("PHOTOSYNTHETIC", "Relating to the process of making food from light", "Science"),
];

/// Word list for a difficulty: ≤3, ≤8, ≤12, then the hardest list.
pub fn word_list_for(difficulty: i64) -> &'static [WordEntry] {
  if difficulty <= 3 {
    WORDS_EASY
  } else if difficulty <= 8 {
    WORDS_MEDIUM
  } else if difficulty <= 12 {
    WORDS_HARD
  } else {
    WORDS_EXPERT
  }
}
