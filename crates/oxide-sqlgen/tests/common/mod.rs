#![allow(dead_code)]

use oxide_sqlgen::{DbEntity, DbEntityManager, OomConfig};

#[derive(Debug, Clone, DbEntity)]
pub struct Boy {
    #[column(id)]
    pub id: i64,
    pub name: String,
    pub girl_id: Option<i64>,
}

#[derive(Debug, Clone, DbEntity)]
#[entity(table = "GIRLS")]
pub struct Girl {
    #[column(id, name = "ID")]
    pub id: i32,
    #[column(name = "NAME")]
    pub name: Option<String>,
    #[column(name = "SPECIALITY")]
    pub speciality: String,
    #[column(name = "AGE")]
    pub age: u8,
}

#[derive(Debug, Clone, DbEntity)]
#[entity(name = "BadBoy", schema = "jail")]
pub struct BadBoyEntity {
    #[column(id)]
    pub ajdi: i64,
    pub nick_name: String,
    pub score: f64,
    pub active: bool,
    #[column(skip)]
    pub cache: Vec<String>,
}

pub fn boy(id: i64, name: &str, girl_id: Option<i64>) -> Boy {
    Boy {
        id,
        name: String::from(name),
        girl_id,
    }
}

pub fn girl(id: i32, name: Option<&str>, speciality: &str, age: u8) -> Girl {
    Girl {
        id,
        name: name.map(String::from),
        speciality: String::from(speciality),
        age,
    }
}

pub fn entities() -> DbEntityManager {
    entities_with(OomConfig::default())
}

pub fn entities_with(config: OomConfig) -> DbEntityManager {
    let mut manager = DbEntityManager::with_config(config);
    manager
        .register::<Boy>()
        .unwrap_or_else(|e| panic!("Failed to register Boy: {e}"));
    manager
        .register::<Girl>()
        .unwrap_or_else(|e| panic!("Failed to register Girl: {e}"));
    manager
        .register::<BadBoyEntity>()
        .unwrap_or_else(|e| panic!("Failed to register BadBoy: {e}"));
    manager
}
