//! Key spaces: how each kind of key becomes a row, and back

use super::{KeyGrammar, RowContext};
use crate::db::tables::{AKA_TITLE, NAME, TITLE};
use crate::db::{Row, TableSpec, Value};
use ptdf_common::db::vocabulary::{kind_from_id, kind_id};
use ptdf_common::grammar::{
    analyze_name, analyze_title, build_name, build_title, series_key, NameFields, ParseError,
    TitleFields, TitleKind,
};
use ptdf_common::phonetic::{name_soundexes, title_soundex};
use std::collections::HashMap;

/// Side-map carrying the year column of episode lines in the movies list
pub const EPISODE_YEAR: &str = "episode_year";
/// Side-map carrying the title an alias belongs to
pub const ALIAS_MOVIE_ID: &str = "movie_id";
/// Side-map carrying the note of an alias
pub const ALIAS_NOTE: &str = "note";

/// Title keys: `Incredibles, The (2004)`
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleKeys;

/// Person name keys: `Parr, Helen (II)`
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonKeys;

/// Alias title keys; every occurrence gets its own id
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasTitleKeys;

impl KeyGrammar for TitleKeys {
    fn name(&self) -> &'static str {
        "titles"
    }

    fn table(&self) -> &'static TableSpec {
        &TITLE
    }

    fn parent_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        series_key(key)
    }

    fn check(&self, key: &str) -> Result<(), ParseError> {
        analyze_title(key).map(|_| ())
    }

    fn build_row(&self, key: &str, id: i64, ctx: &RowContext<'_>) -> Result<Row, ParseError> {
        let fields = analyze_title(key)?;
        let mut row = vec![Value::Int(id)];
        row.extend(title_columns(key, &fields, ctx));
        Ok(row)
    }

    fn keys_from_rows(&self, rows: &[Row]) -> Vec<(String, i64)> {
        title_keys(rows, 1)
    }
}

impl KeyGrammar for PersonKeys {
    fn name(&self) -> &'static str {
        "persons"
    }

    fn table(&self) -> &'static TableSpec {
        &NAME
    }

    fn check(&self, key: &str) -> Result<(), ParseError> {
        analyze_name(key).map(|_| ())
    }

    fn build_row(&self, key: &str, id: i64, _ctx: &RowContext<'_>) -> Result<Row, ParseError> {
        let fields = analyze_name(key)?;
        let mut row = vec![Value::Int(id)];
        row.extend(name_columns(&fields));
        Ok(row)
    }

    fn keys_from_rows(&self, rows: &[Row]) -> Vec<(String, i64)> {
        rows.iter()
            .filter_map(|row| {
                let id = row.first()?.as_int()?;
                let name = row.get(1)?.as_text()?.to_string();
                let imdb_index = row.get(2).and_then(Value::as_text).map(str::to_string);
                Some((build_name(&NameFields { name, imdb_index }), id))
            })
            .collect()
    }
}

impl KeyGrammar for AliasTitleKeys {
    fn name(&self) -> &'static str {
        "alias titles"
    }

    fn table(&self) -> &'static TableSpec {
        &AKA_TITLE
    }

    fn parent_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        series_key(key)
    }

    fn check(&self, key: &str) -> Result<(), ParseError> {
        analyze_title(key).map(|_| ())
    }

    fn build_row(&self, key: &str, id: i64, ctx: &RowContext<'_>) -> Result<Row, ParseError> {
        let fields = analyze_title(key)?;
        let movie_id = ctx.aux(ALIAS_MOVIE_ID).cloned().unwrap_or(Value::Null);
        let note = ctx.aux(ALIAS_NOTE).cloned().unwrap_or(Value::Null);

        let mut row = vec![Value::Int(id), movie_id];
        row.extend(title_columns(key, &fields, ctx));
        row.push(note);
        Ok(row)
    }

    fn keys_from_rows(&self, rows: &[Row]) -> Vec<(String, i64)> {
        title_keys(rows, 2)
    }
}

/// `title` through `episode_nr`
fn title_columns(key: &str, fields: &TitleFields, ctx: &RowContext<'_>) -> Vec<Value> {
    let production_year = ctx
        .aux(EPISODE_YEAR)
        .and_then(Value::as_text)
        .and_then(|year| year.parse::<i64>().ok())
        .or_else(|| fields.production_year());

    let episode_of_id = if fields.kind == TitleKind::Episode {
        series_key(key).and_then(|series| ctx.id_of(series))
    } else {
        None
    };

    vec![
        Value::Text(fields.title.clone()),
        fields.imdb_index.clone().into(),
        Value::Int(kind_id(fields.kind)),
        production_year.into(),
        title_soundex(&fields.title).into(),
        episode_of_id.into(),
        fields.season.into(),
        fields.episode.into(),
    ]
}

/// `name` through `surname_pcode`; also the layout of alias name rows
pub fn name_columns(fields: &NameFields) -> Vec<Value> {
    let codes = name_soundexes(&fields.name);
    vec![
        Value::Text(fields.name.clone()),
        fields.imdb_index.clone().into(),
        codes.canonical.into(),
        codes.normal.into(),
        codes.surname.into(),
    ]
}

/// Rebuild title keys from stored rows whose `title` column is at `title_at`
///
/// Episode keys need their series row, so all rows are decoded before any
/// key is built. Original air dates are not stored and cannot be rebuilt.
fn title_keys(rows: &[Row], title_at: usize) -> Vec<(String, i64)> {
    let decoded: Vec<(i64, TitleFields, Option<i64>)> = rows
        .iter()
        .filter_map(|row| {
            let id = row.first()?.as_int()?;
            let column = |offset: usize| row.get(title_at + offset);

            let kind = kind_from_id(column(2)?.as_int()?)?;
            let mut fields = TitleFields::new(column(0)?.as_text()?, kind);
            fields.imdb_index = column(1).and_then(Value::as_text).map(str::to_string);
            fields.year = column(3).and_then(Value::as_int).map(|year| year.to_string());
            fields.season = column(6).and_then(Value::as_int);
            fields.episode = column(7).and_then(Value::as_int);
            let episode_of = column(5).and_then(Value::as_int);
            Some((id, fields, episode_of))
        })
        .collect();

    let by_id: HashMap<i64, &TitleFields> = decoded.iter().map(|(id, fields, _)| (*id, fields)).collect();

    decoded
        .iter()
        .map(|(id, fields, episode_of)| {
            let mut fields = fields.clone();
            if let Some(series) = episode_of.and_then(|series_id| by_id.get(&series_id)) {
                fields.episode_of = Some(Box::new((*series).clone()));
            }
            (build_title(&fields), *id)
        })
        .collect()
}
