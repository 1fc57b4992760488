//! Column layouts of the tables the loader writes
//!
//! Rows handed to a [`Store`](super::Store) follow the column order listed
//! here. Vocabulary tables are seeded by `ptdf_common::db` and never written
//! through the store.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSpec {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

pub const TITLE: TableSpec = TableSpec {
    name: "title",
    columns: &[
        "id",
        "title",
        "imdb_index",
        "kind_id",
        "production_year",
        "phonetic_code",
        "episode_of_id",
        "season_nr",
        "episode_nr",
    ],
};

pub const NAME: TableSpec = TableSpec {
    name: "name",
    columns: &[
        "id",
        "name",
        "imdb_index",
        "name_pcode_cf",
        "name_pcode_nf",
        "surname_pcode",
    ],
};

pub const AKA_TITLE: TableSpec = TableSpec {
    name: "aka_title",
    columns: &[
        "id",
        "movie_id",
        "title",
        "imdb_index",
        "kind_id",
        "production_year",
        "phonetic_code",
        "episode_of_id",
        "season_nr",
        "episode_nr",
        "note",
    ],
};

pub const AKA_NAME: TableSpec = TableSpec {
    name: "aka_name",
    columns: &[
        "person_id",
        "name",
        "imdb_index",
        "name_pcode_cf",
        "name_pcode_nf",
        "surname_pcode",
    ],
};

pub const CAST_INFO: TableSpec = TableSpec {
    name: "cast_info",
    columns: &["person_id", "movie_id", "person_role", "note", "nr_order", "role_id"],
};

pub const MOVIE_INFO: TableSpec = TableSpec {
    name: "movie_info",
    columns: &["movie_id", "info_type_id", "info", "note"],
};

pub const PERSON_INFO: TableSpec = TableSpec {
    name: "person_info",
    columns: &["person_id", "info_type_id", "info", "note"],
};

pub const MOVIE_LINK: TableSpec = TableSpec {
    name: "movie_link",
    columns: &["movie_id", "linked_movie_id", "link_type_id"],
};

pub const COMPLETE_CAST: TableSpec = TableSpec {
    name: "complete_cast",
    columns: &["movie_id", "subject_id", "status_id"],
};
