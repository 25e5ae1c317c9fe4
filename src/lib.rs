pub mod core;
pub mod storage;
pub mod index;
pub mod query;
pub mod memory;

pub use crate::core::collection::Collection;
pub use crate::core::config::{Config, IndexedFields, ResizePolicy};
pub use crate::core::error::{DurabilityCause, Error, ErrorKind, Result};
pub use crate::core::stats::{CollectionStats, PolicyKind};
pub use crate::core::types::{auto_id, from_record, to_record, IdGenerator, Record, RecordId, UuidGenerator, Value};
pub use crate::query::{Comparator, Matcher, Operand, Pattern, Query, Where};

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                            LUXDB STRUCT ARCHITECTURE                          │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── CORE LAYER ──────────────────────────────────┐
│                                                                              │
│  ┌────────────────────────────────────────────────────────────────────┐     │
│  │                        struct Collection                            │     │
│  │  shared: Arc<Shared>                // cache + persistence          │     │
│  │  pending: Mutex<Vec<JoinHandle>>    // background insert flushes    │     │
│  │  _lock: FileLock                    // released on drop             │     │
│  └────────────────────────────────────────────────────────────────────┘     │
│                                                                              │
│  ┌──────────────────┐  ┌──────────────────┐  ┌─────────────────────────┐    │
│  │ struct Config    │  │ type Record      │  │ struct CollectionStats  │    │
│  │ • location       │  │ • Map<String,    │  │ • size / capacity       │    │
│  │ • max_cache_size │  │   Value>         │  │ • evictions / resizes   │    │
│  │ • resize         │  │ enum RecordId    │  │ • dirty / flush_count   │    │
│  │ • id_field       │  │ • Text | Number  │  │ • last_flush_time       │    │
│  │ • indexed_fields │  └──────────────────┘  └─────────────────────────┘    │
│  └──────────────────┘                                                        │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── QUERY LAYER ─────────────────────────────────┐
│                                                                              │
│  Query<Op> ──where_()──▶ Where<Op> ──equals()/between()/...──▶ Query<Op>     │
│      │                                                                       │
│      └── run() ──▶ Operation::execute(&mut RecordCache, &[Matcher])          │
│                     GetOne / GetAll / UpdateOne / UpdateAll /                │
│                     DeleteOne / DeleteAll                                    │
│                                                                              │
│  path::resolve ◀── matcher::matches ◀── scan::select ──▶ FieldIndex          │
│  projection::project                                                         │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── MEMORY LAYER ────────────────────────────────┐
│                                                                              │
│  ┌──────────────────────────────┐   ┌──────────────────────────────┐        │
│  │ struct RecordCache           │   │ struct CapacityManager       │        │
│  │ • records: HashMap<Id, Slot> │   │ • max_size                   │        │
│  │ • order: BTreeMap<seq, Id>   │   │ • policy: Fixed | Dynamic    │        │
│  │ • recency: LruCache<Id, ()>  │   │ • resizes                    │        │
│  │ • index: FieldIndex          │   └──────────────────────────────┘        │
│  │ • generation / flushed       │                                            │
│  └──────────────────────────────┘                                            │
└──────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── STORAGE LAYER ───────────────────────────────┐
│                                                                              │
│  ┌────────────────────────┐  ┌──────────────────────┐  ┌─────────────────┐  │
│  │ struct Persistence     │  │ struct JsonFileStore │  │ struct FileLock │  │
│  │ • gate: tokio Mutex    │  │ • path: {name}.json  │  │ • flock(2)      │  │
│  │ • flush_count          │  │ • tmp + rename       │  └─────────────────┘  │
│  │ • last_flush           │  └──────────────────────┘                        │
│  └────────────────────────┘  ┌──────────────────────┐                        │
│                              │ struct StorageLayout │                        │
│                              │ • base_dir           │                        │
│                              └──────────────────────┘                        │
└──────────────────────────────────────────────────────────────────────────────┘
*/
