//! Linguistic parsing capability.
//!
//! The extractor needs only tokenization, lemma, part-of-speech, dependency
//! role and head index. Any parser that produces Universal Dependencies
//! labels can sit behind [`LinguisticParser`].

/// Coarse part-of-speech, using Universal Dependencies UPOS tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Auxiliary,
    Adposition,
    Punctuation,
    Other(String),
}

impl PartOfSpeech {
    /// Maps a UPOS tag such as `NOUN` or `PROPN`.
    pub fn from_upos(tag: &str) -> Self {
        match tag {
            "NOUN" => Self::Noun,
            "PROPN" => Self::ProperNoun,
            "VERB" => Self::Verb,
            "AUX" => Self::Auxiliary,
            "ADP" => Self::Adposition,
            "PUNCT" => Self::Punctuation,
            other => Self::Other(other.to_string()),
        }
    }

    /// Common or proper noun.
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun)
    }
}

/// Dependency relation to the head token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRole {
    Root,
    /// `obj`: direct object.
    Object,
    /// `obl`: oblique nominal, e.g. a destination.
    Oblique,
    /// `nmod`: nominal modifier.
    NominalModifier,
    Other(String),
}

impl DependencyRole {
    /// Maps a UD relation label; subtypes such as `obl:tmod` keep their base.
    pub fn from_label(label: &str) -> Self {
        let base = label.split(':').next().unwrap_or(label);
        match base.to_ascii_lowercase().as_str() {
            "root" => Self::Root,
            "obj" => Self::Object,
            "obl" => Self::Oblique,
            "nmod" => Self::NominalModifier,
            _ => Self::Other(label.to_string()),
        }
    }

    /// Relations that may carry a command verb's object.
    pub fn can_carry_object(&self) -> bool {
        matches!(self, Self::Object | Self::Oblique | Self::NominalModifier)
    }
}

/// One parsed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    /// Dictionary form.
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub dep: DependencyRole,
    /// Index of the head token in the same sequence; roots point at themselves.
    pub head: usize,
}

impl Token {
    pub fn new(
        surface: impl Into<String>,
        lemma: impl Into<String>,
        pos: PartOfSpeech,
        dep: DependencyRole,
        head: usize,
    ) -> Self {
        Self {
            surface: surface.into(),
            lemma: lemma.into(),
            pos,
            dep,
            head,
        }
    }
}

/// Tokenizer + tagger + dependency parser.
///
/// Implementations must be deterministic: the same text yields the same
/// token sequence.
pub trait LinguisticParser {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl<T: LinguisticParser + ?Sized> LinguisticParser for &T {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        (**self).tokenize(text)
    }
}

/// Direct dependents of `head_index`, in sentence order.
pub fn children(tokens: &[Token], head_index: usize) -> impl Iterator<Item = &Token> {
    tokens
        .iter()
        .enumerate()
        .filter(move |(index, token)| *index != head_index && token.head == head_index)
        .map(|(_, token)| token)
}

#[cfg(test)]
mod tests {
    use super::{children, DependencyRole, PartOfSpeech, Token};

    #[test]
    fn dependency_labels_keep_their_base_relation() {
        assert_eq!(DependencyRole::from_label("obl:tmod"), DependencyRole::Oblique);
        assert_eq!(DependencyRole::from_label("OBJ"), DependencyRole::Object);
        assert_eq!(
            DependencyRole::from_label("nsubj"),
            DependencyRole::Other("nsubj".to_string())
        );
    }

    #[test]
    fn children_skip_self_headed_root() {
        let tokens = vec![
            Token::new("卵", "卵", PartOfSpeech::Noun, DependencyRole::Object, 2),
            Token::new("を", "を", PartOfSpeech::Adposition, DependencyRole::Other("case".into()), 0),
            Token::new("買う", "買う", PartOfSpeech::Verb, DependencyRole::Root, 2),
        ];
        let found: Vec<&str> = children(&tokens, 2).map(|t| t.surface.as_str()).collect();
        assert_eq!(found, vec!["卵"]);
    }
}
