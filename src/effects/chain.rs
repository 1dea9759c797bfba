use std::fmt;

use crate::foundation::error::{MoshError, MoshResult};

/// Effect names understood by the sox effect chain.
///
/// Used only to split a flat token list into effects; the collaborator remains the authority
/// on what an effect accepts.
pub const SOX_EFFECTS: &[&str] = &[
    "allpass", "band", "bandpass", "bandreject", "bass", "bend", "biquad", "chorus", "channels",
    "compand", "contrast", "dcshift", "deemph", "delay", "dither", "divide", "downsample",
    "earwax", "echo", "echos", "equalizer", "fade", "fir", "firfit", "flanger", "gain",
    "highpass", "hilbert", "loudness", "lowpass", "mcompand", "noiseprof", "noisered", "norm",
    "oops", "overdrive", "pad", "phaser", "pitch", "rate", "remix", "repeat", "reverb",
    "reverse", "riaa", "silence", "sinc", "speed", "splice", "stat", "stats", "stretch", "swap",
    "synth", "tempo", "treble", "tremolo", "trim", "upsample", "vad", "vol",
];

/// Example invocations printed by `--effects`: effect tokens and a short description.
pub const EXAMPLE_EFFECTS: &[(&str, &str)] = &[
    ("bass 5", "boost low frequencies; smears dark regions"),
    ("echo 0.8 0.88 60 0.4", "single echo; ghosted copies shifted along each row"),
    ("echos 0.8 0.7 700 0.25 700 0.3", "multiple echoes; repeated banding"),
    ("chorus 0.7 0.9 55 0.4 0.25 2 -t", "chorus; wavy colour fringes"),
    ("flanger", "flanger with defaults; diagonal tearing"),
    ("phaser 0.8 0.74 3 0.4 0.5 -t", "phaser; periodic colour bands"),
    ("pitch 300", "pitch shift; stretched and sheared rows"),
    ("reverb 90 50 100", "reverb; long colour tails"),
    ("reverse", "reverse the stream; mirrors the image bytes"),
    ("speed 1.2", "speed up; fewer bytes, drops trailing frames"),
    ("tremolo 20 40", "amplitude wobble; brightness stripes"),
    ("treble 10", "boost high frequencies; sharpened noise"),
    ("vol 2", "gain; blown-out colours"),
];

/// One named effect and its ordered parameters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Effect {
    /// Effect name as the collaborator knows it.
    pub name: String,
    /// Ordered parameters, passed verbatim.
    #[serde(default)]
    pub params: Vec<String>,
}

impl Effect {
    /// Build an effect from a name and parameters.
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered effect list applied identically to every stream of a run.
///
/// Effects do not commute; order is preserved end to end.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EffectSpec {
    effects: Vec<Effect>,
}

impl EffectSpec {
    /// Wrap an ordered effect list.
    pub fn new(effects: Vec<Effect>) -> Self {
        Self { effects }
    }

    /// Split free-form tokens into effects.
    ///
    /// A token naming a known effect starts a new effect; any other token is a parameter of
    /// the current effect. A leading unknown token still starts an effect so the collaborator
    /// can report it.
    pub fn parse<I, S>(tokens: I) -> MoshResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut effects: Vec<Effect> = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            if token.is_empty() {
                return Err(MoshError::usage("effect tokens must be non-empty"));
            }
            if !is_known_effect(token)
                && let Some(current) = effects.last_mut()
            {
                current.params.push(token.to_string());
                continue;
            }
            if effects.is_empty() && token.starts_with('-') {
                return Err(MoshError::usage(format!(
                    "effect list must start with an effect name, got '{token}'"
                )));
            }
            effects.push(Effect::new(token, Vec::<String>::new()));
        }
        Ok(Self { effects })
    }

    /// Effects in application order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// `true` when no effect is configured (identity chain).
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Flatten back to the ordered token list handed to the collaborator.
    pub fn to_args(&self) -> Vec<String> {
        self.effects
            .iter()
            .flat_map(|e| std::iter::once(e.name.clone()).chain(e.params.iter().cloned()))
            .collect()
    }
}

impl fmt::Display for EffectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.effects.is_empty() {
            return f.write_str("(identity)");
        }
        f.write_str(&self.to_args().join(" "))
    }
}

/// `true` when `token` names a sox effect.
pub fn is_known_effect(token: &str) -> bool {
    SOX_EFFECTS.contains(&token)
}

/// Render the `--effects` catalog.
pub fn effects_catalog() -> String {
    let width = EXAMPLE_EFFECTS
        .iter()
        .map(|(tokens, _)| tokens.len())
        .max()
        .unwrap_or(0);
    let mut out = String::from("example effect invocations (append after <input> <output>):\n");
    for (tokens, about) in EXAMPLE_EFFECTS {
        out.push_str(&format!("  {tokens:<width$}  {about}\n"));
    }
    out.push_str("\neffects are applied in order; see `man sox` for every parameter.\n");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chain.rs"]
mod tests;
