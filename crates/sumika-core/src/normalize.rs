//! Text normalization for building names and Japanese addresses.
//!
//! Every function here is pure and total: empty input produces empty output,
//! and reapplying a normalizer to its own output is a no-op. Compiled
//! patterns live in immutable `LazyLock` statics; there is no shared mutable
//! state anywhere in this module.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ─── Shared tables ───────────────────────────────────────────────────────────

/// Dash-like glyphs that appear in scraped names and addresses.
const DASHES: [char; 7] = ['‐', '‑', '‒', '–', '—', '―', '−'];

/// All 47 prefecture names, longest-match-safe (no name is a prefix of
/// another).
pub const PREFECTURES: [&str; 47] = [
  "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
  "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
  "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県", "岐阜県",
  "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府", "兵庫県",
  "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県",
  "徳島県", "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県",
  "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

/// Cities in the service region known to belong to exactly one prefecture.
/// A city name that exists in more than one prefecture must not be listed,
/// or prefixing would guess.
const CITY_PREFECTURES: [(&str, &str); 20] = [
  ("北九州市", "福岡県"),
  ("福岡市", "福岡県"),
  ("久留米市", "福岡県"),
  ("大牟田市", "福岡県"),
  ("飯塚市", "福岡県"),
  ("田川市", "福岡県"),
  ("柳川市", "福岡県"),
  ("八女市", "福岡県"),
  ("筑後市", "福岡県"),
  ("直方市", "福岡県"),
  ("行橋市", "福岡県"),
  ("豊前市", "福岡県"),
  ("中間市", "福岡県"),
  ("筑紫野市", "福岡県"),
  ("春日市", "福岡県"),
  ("大野城市", "福岡県"),
  ("宗像市", "福岡県"),
  ("太宰府市", "福岡県"),
  ("古賀市", "福岡県"),
  ("糸島市", "福岡県"),
];

// ─── Compiled patterns ───────────────────────────────────────────────────────

/// Trailing room token: 1–4 digits, optionally a room-indicator word,
/// optionally led in by a space or hyphen.
static ROOM_SUFFIX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[ \-]*[0-9]{1,4}(?:号室|号|室)?$").unwrap());

/// Kanji numerals directly before a block marker.
static KANJI_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"([〇一二三四五六七八九十百]+)(丁目|番地|番|号)").unwrap()
});

/// Block markers that join onto the next element: `1丁目2` → `1-2`.
static JOINING_MARKERS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([0-9]+)(?:丁目|番地|番)").unwrap());

/// Terminal 号 marker: `3号` → `3`.
static GO_MARKER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([0-9]+)号").unwrap());

static MULTI_HYPHEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

// ─── Name normalization ──────────────────────────────────────────────────────

/// Normalize a raw building name into its canonical matching form.
///
/// NFKC-folds width and combining variants, collapses whitespace, unifies
/// dash glyphs, strips one-or-more trailing room tokens, and trims stray
/// hyphens and spaces. Idempotent.
pub fn normalize_name(raw: &str) -> String {
  let folded: String = raw.nfkc().collect();
  let mut name = collapse_whitespace(&unify_dashes(&folded));

  // Strip to a fixpoint so a second application cannot find a new trailing
  // token ("ビル201 202" must not lose "201" on re-normalization).
  loop {
    let trimmed = name.trim_matches([' ', '-']).to_string();
    let stripped = ROOM_SUFFIX.replace(&trimmed, "").into_owned();
    if stripped == name {
      return name;
    }
    name = stripped;
  }
}

// ─── Address normalization ───────────────────────────────────────────────────

/// Normalize a raw Japanese address into its canonical matching form.
///
/// `"北九州市小倉北区魚町一丁目2番3号"` becomes
/// `"福岡県北九州市小倉北区魚町1-2-3"`: NFKC fold, whitespace removal, dash
/// unification, kanji-numeral conversion before block markers, prefecture
/// prefixing for unambiguous cities, repeated-city collapse, and block-marker
/// rewriting into a hyphen-joined tuple. Idempotent.
pub fn normalize_address(raw: &str) -> String {
  let folded: String = raw.nfkc().collect();
  let compact: String = folded.chars().filter(|c| !c.is_whitespace()).collect();
  let dashed = fold_digit_prolonged_marks(&unify_dashes(&compact));

  let arabic = KANJI_BLOCK.replace_all(&dashed, |caps: &regex::Captures<'_>| {
    match kanji_to_number(&caps[1]) {
      Some(n) => format!("{n}{}", &caps[2]),
      None => caps[0].to_string(),
    }
  });

  let deduped = collapse_repeated_city(&arabic);
  let prefixed = prefix_prefecture(&deduped);

  let joined = JOINING_MARKERS.replace_all(&prefixed, "$1-");
  let terminal = GO_MARKER.replace_all(&joined, "$1");
  let collapsed = MULTI_HYPHEN.replace_all(&terminal, "-");

  collapsed.trim_matches('-').to_string()
}

/// Strip one leading prefecture name; used for address-equality comparison
/// keys, never for display.
pub fn strip_prefecture(addr: &str) -> &str {
  for pref in PREFECTURES {
    if let Some(rest) = addr.strip_prefix(pref) {
      return rest;
    }
  }
  addr
}

/// The stored prefecture-agnostic comparison key for a normalized address.
pub fn addr_key(norm_address: &str) -> String {
  strip_prefecture(norm_address).to_string()
}

/// A weak address carries too little structure to trust for equality
/// matching: no digit at all, or a block marker that had no number to absorb
/// during normalization.
pub fn is_weak_address(norm_address: &str) -> bool {
  if !norm_address.chars().any(|c| c.is_ascii_digit()) {
    return true;
  }
  ["丁目", "番地", "番", "号"]
    .iter()
    .any(|marker| norm_address.contains(marker))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn unify_dashes(s: &str) -> String {
  s.chars()
    .map(|c| if DASHES.contains(&c) { '-' } else { c })
    .collect()
}

/// A prolonged-sound mark directly after a digit is a hyphen in disguise
/// (`1ー2ー3`); elsewhere it is part of a katakana word and must survive.
fn fold_digit_prolonged_marks(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut prev_digit = false;
  for c in s.chars() {
    if c == 'ー' && prev_digit {
      out.push('-');
      prev_digit = false;
    } else {
      prev_digit = c.is_ascii_digit();
      out.push(c);
    }
  }
  out
}

fn collapse_whitespace(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a kanji numeral (1–999, 十/百 compounds included).
fn kanji_to_number(s: &str) -> Option<u32> {
  fn digit(c: char) -> Option<u32> {
    match c {
      '〇' => Some(0),
      '一' => Some(1),
      '二' => Some(2),
      '三' => Some(3),
      '四' => Some(4),
      '五' => Some(5),
      '六' => Some(6),
      '七' => Some(7),
      '八' => Some(8),
      '九' => Some(9),
      _ => None,
    }
  }

  let mut total = 0u32;
  let mut current = 0u32;
  for c in s.chars() {
    if let Some(d) = digit(c) {
      current = current * 10 + d;
    } else if c == '十' {
      total += if current == 0 { 1 } else { current } * 10;
      current = 0;
    } else if c == '百' {
      total += if current == 0 { 1 } else { current } * 100;
      current = 0;
    } else {
      return None;
    }
  }
  Some(total + current)
}

/// Collapse the scraper artifact where a prefecture qualifier duplicated the
/// city name (`福岡県北九州市北九州市小倉…` → one occurrence).
fn collapse_repeated_city(addr: &str) -> String {
  let mut out = addr.to_string();
  for (city, _) in CITY_PREFECTURES {
    let doubled = format!("{city}{city}");
    while let Some(pos) = out.find(&doubled) {
      out.replace_range(pos..pos + doubled.len(), city);
    }
  }
  out
}

/// Prefix the prefecture when the address starts directly with a city that
/// belongs to exactly one prefecture.
fn prefix_prefecture(addr: &str) -> String {
  for (city, pref) in CITY_PREFECTURES {
    if addr.starts_with(city) {
      return format!("{pref}{addr}");
    }
  }
  addr.to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  // ── Names ──────────────────────────────────────────────────────────────

  #[test]
  fn name_folds_width_variants() {
    assert_eq!(normalize_name("ｻﾝﾊｲﾂ魚町"), "サンハイツ魚町");
    assert_eq!(normalize_name("グランド　タワー"), "グランド タワー");
  }

  #[test]
  fn name_strips_room_suffix() {
    assert_eq!(normalize_name("サンハイツ101号室"), "サンハイツ");
    assert_eq!(normalize_name("サンハイツ 101号"), "サンハイツ");
    assert_eq!(normalize_name("サンハイツ-203室"), "サンハイツ");
    assert_eq!(normalize_name("コーポ光 305"), "コーポ光");
  }

  #[test]
  fn name_unifies_dash_glyphs() {
    assert_eq!(normalize_name("メゾン―ド―パリ"), "メゾン-ド-パリ");
    assert_eq!(normalize_name("ハイム−小倉"), "ハイム-小倉");
  }

  #[test]
  fn name_keeps_prolonged_sound_marks() {
    assert_eq!(normalize_name("シティタワー小倉"), "シティタワー小倉");
  }

  #[test]
  fn name_is_idempotent() {
    for raw in ["ｻﾝﾊｲﾂ 101号室", "ビル201 202", "—メゾン— 303", ""] {
      let once = normalize_name(raw);
      assert_eq!(normalize_name(&once), once, "input {raw:?}");
    }
  }

  #[test]
  fn empty_name_stays_empty() {
    assert_eq!(normalize_name(""), "");
    assert_eq!(normalize_name("   "), "");
  }

  // ── Addresses ──────────────────────────────────────────────────────────

  #[test]
  fn address_collapses_block_markers() {
    assert_eq!(
      normalize_address("北九州市小倉北区魚町1丁目2番3号"),
      "福岡県北九州市小倉北区魚町1-2-3"
    );
    assert_eq!(
      normalize_address("福岡県北九州市小倉北区魚町1丁目2番地3号"),
      "福岡県北九州市小倉北区魚町1-2-3"
    );
  }

  #[test]
  fn address_converts_kanji_numerals() {
    assert_eq!(
      normalize_address("北九州市小倉北区魚町一丁目二番三号"),
      "福岡県北九州市小倉北区魚町1-2-3"
    );
    assert_eq!(
      normalize_address("福岡市中央区天神二十三番地"),
      "福岡県福岡市中央区天神23"
    );
  }

  #[test]
  fn address_prefixes_unambiguous_city() {
    assert_eq!(
      normalize_address("久留米市東町1-1"),
      "福岡県久留米市東町1-1"
    );
    // Unknown leading token: left alone.
    assert_eq!(normalize_address("小倉北区魚町1-2"), "小倉北区魚町1-2");
  }

  #[test]
  fn address_collapses_repeated_city() {
    assert_eq!(
      normalize_address("福岡県北九州市北九州市小倉北区魚町1-2-3"),
      "福岡県北九州市小倉北区魚町1-2-3"
    );
    assert_eq!(
      normalize_address("北九州市北九州市小倉北区魚町1-2-3"),
      "福岡県北九州市小倉北区魚町1-2-3"
    );
  }

  #[test]
  fn address_removes_whitespace_and_folds_width() {
    assert_eq!(
      normalize_address("北九州市 小倉北区　魚町１丁目２番３号"),
      "福岡県北九州市小倉北区魚町1-2-3"
    );
  }

  #[test]
  fn address_folds_prolonged_marks_only_after_digits() {
    assert_eq!(
      normalize_address("北九州市小倉北区魚町1ー2ー3"),
      "福岡県北九州市小倉北区魚町1-2-3"
    );
    assert_eq!(
      normalize_address("北九州市小倉北区シーサイド通り1-2"),
      "福岡県北九州市小倉北区シーサイド通り1-2"
    );
  }

  #[test]
  fn address_is_idempotent() {
    for raw in [
      "北九州市小倉北区魚町1丁目2番3号",
      "福岡県北九州市北九州市小倉北区魚町一丁目二番三号",
      "小倉北区魚町",
      "",
    ] {
      let once = normalize_address(raw);
      assert_eq!(normalize_address(&once), once, "input {raw:?}");
    }
  }

  // ── Prefecture stripping and weakness ──────────────────────────────────

  #[test]
  fn strip_prefecture_removes_one_leading_prefecture() {
    assert_eq!(
      strip_prefecture("福岡県北九州市小倉北区魚町1-2-3"),
      "北九州市小倉北区魚町1-2-3"
    );
    assert_eq!(strip_prefecture("北九州市魚町1-2"), "北九州市魚町1-2");
  }

  #[test]
  fn weak_addresses_are_detected() {
    // No digits at all.
    assert!(is_weak_address("福岡県北九州市小倉北区魚町"));
    // Dangling marker that had no number to absorb.
    assert!(is_weak_address(&normalize_address("北九州市小倉北区魚町丁目")));
    assert!(is_weak_address(""));
    assert!(!is_weak_address("福岡県北九州市小倉北区魚町1-2-3"));
  }
}
