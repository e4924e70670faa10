//! Closed-class words that cannot open or close a meaningful phrase.
//!
//! A sequence such as "of two or" is a fragment, while "grammatical
//! construction" stands on its own. A phrase whose first or last token is an
//! article, pronoun, preposition, postposition, conjunction, auxiliary verb or
//! a single letter is red-flagged.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9_]*'?[a-zA-Z0-9_]+").expect("static token pattern"));

// Multi-word entries ("no one", "vis--vis") are tokenized like phrases, so
// each of their words is flagged on its own.
const FLAG_WORDS: &str = "the, a, an, I, me, we, us, you, he, him, she, her, it, they, them, \
my, your, his, its, our, their, myself, himself, herself, itself, ourselves, yourselves, \
themselves, this, these, that, those, former, latter, who, whom, which, when, where, what, \
whose, why, how, something, anything, nothing, somewhere, anywhere, nowhere, someone, anyone, \
no one, ours, some, none, no, thou, thee, ye, \
aboard, about, above, absent, across, after, against, gainst, again, along, alongst, alongside, \
amid, amidst, midst, among, amongst, apropos, apud, around, as, astride, at, atop, ontop, before, \
afore, tofore, behind, ahind, below, ablow, beneath, beside, besides, between, atween, beyond, \
ayond, but, by, chez, circa, despite, spite, down, during, except, for, from, in, inside, into, \
less, like, minus, near, nearer, nearest, anear, notwithstanding, of, off, on, onto, opposite, \
out, outen, outside, over, per, plus, since, than, through, thru, throughout, thruout, till, to, \
toward, towards, under, underneath, unlike, until, unto, up, upon, upside, versus, via, vis--vis, \
with, within, without, worth, abaft, abeam, aboon, abun, abune, afront, ajax, aloof, anenst, \
anent, athwart, behither, betwixt, atwix, bewest, benorth, emforth, forby, foreanent, forenenst, \
foregain, foregainst, forth, fromward, froward, fromwards, furth, gainward, imell, inmid, \
inmiddes, mauger, maugre, nearhand, next, outwith, overthwart, quoad, umbe, umb, uptill, \
ago, apart, aside, aslant, away, hence, withal, \
and, nor, or, yet, so, either, both, whether, rather, because, if, while, \
be, is, isn't, are, ain't, was, wasn't, were, weren't, am, will, shall, won't, should, \
shouldn't, could, couldn't, would, wouldn't, has, have, had, do, don't, did, didn't, \
b, c, d, e, f, g, h, j, k, l, m, n, o, p, q, r, s, t, u, v, w, x, y, z";

static FUNCTION_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| TOKEN_PATTERN.find_iter(FLAG_WORDS).map(|m| m.as_str()).collect());

/// Split a phrase into the tokens used for the well-formedness check.
pub fn phrase_tokens(text: &str) -> Vec<&str> {
    TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn is_function_word(token: &str) -> bool {
    FUNCTION_WORDS.contains(token)
}

/// `true` when the phrase starts or ends with a closed-class word.
/// A phrase without any token is a fragment as well.
pub fn is_red_flagged(text: &str) -> bool {
    let tokens = phrase_tokens(text);
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => is_function_word(first) || is_function_word(last),
        _ => true,
    }
}
