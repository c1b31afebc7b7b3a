//! The game session: world state, action handlers, and the turn loop.
//!
//! A [`Session`] owns everything a running game needs (the location graph,
//! the player, the used-objects set, the dialogue stack, and the terminal
//! flag) and is threaded explicitly through every operation, so multiple
//! sessions can coexist and tests stay deterministic. Each call to
//! [`Session::submit`] processes one complete turn and returns the lines it
//! printed.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use crate::engine::errors::EngineError;
use crate::engine::output::{LineClass, OutputLine};
use crate::engine::parser::{parse, Intent};
use crate::engine::player::Player;
use crate::engine::prompt::{
    condition_met, prompts_at, resolve_prompt, resolve_prompt_mut, resolve_response_mut, PathSeg,
    PromptFrame, PromptPath,
};
use crate::engine::resolver::{self, ObjectRef, ObjectScope};
use crate::engine::trigger::Extensions;
use crate::engine::types::{GameDefinition, GameObject, Location, UseTarget, VictoryConditions};
use crate::engine::victory;
use crate::logutil::escape_log;
use crate::storage::{
    get_json, set_json, SaveStore, SAVE_KEY_INVENTORY, SAVE_KEY_LOCATION, SAVE_KEY_LOCATIONS,
};

/// Optional opening banner printed by [`Session::start`].
#[derive(Debug, Clone, Default)]
pub struct Banner {
    pub title: String,
    pub description: String,
    pub show_help: bool,
}

/// A running game.
pub struct Session {
    locations: HashMap<String, Location>,
    victory: VictoryConditions,
    player: Player,
    used_objects: HashSet<String>,
    prompt_stack: Vec<PromptFrame>,
    prompt_mode: bool,
    game_victory: bool,
    /// JSON snapshot of the authored definition, kept for restarts.
    pristine: String,
    store: Option<Box<dyn SaveStore>>,
    banner: Option<Banner>,
    output: Vec<OutputLine>,
}

enum MoveLookup {
    NoSuchDirection,
    Blocked(String),
    Go(String),
}

impl Session {
    /// Build a session over an authored game. Pass a store to enable
    /// save/restore; without one the session runs in no-save mode.
    pub fn new(
        definition: GameDefinition,
        store: Option<Box<dyn SaveStore>>,
    ) -> Result<Self, EngineError> {
        let pristine = serde_json::to_string(&definition)?;
        let player = Player::new(
            definition.starting_inventory.clone(),
            &definition.start_location,
        );
        Ok(Self {
            locations: definition.locations,
            victory: definition.victory,
            player,
            used_objects: HashSet::new(),
            prompt_stack: Vec::new(),
            prompt_mode: false,
            game_victory: false,
            pristine,
            store,
            banner: None,
            output: Vec::new(),
        })
    }

    /// Attach an opening banner (title, description, help-on-start).
    pub fn with_banner(mut self, banner: Banner) -> Self {
        self.banner = Some(banner);
        self
    }

    /// Begin (or resume) play: print the banner, restore a save when one
    /// exists, run the initial victory check, and surface the starting
    /// location's visit text and prompts.
    pub fn start(&mut self, ext: &mut Extensions) -> Vec<OutputLine> {
        debug!("starting session");
        if let Some(banner) = self.banner.clone() {
            self.print(LineClass::Title, &banner.title);
            self.print(LineClass::Description, &banner.description);
            if banner.show_help {
                self.display_help();
            }
        }

        self.try_restore();

        // a restored save may already satisfy the victory block
        self.check_for_victory(ext);

        if !self.game_victory {
            let location_id = self.player.location().to_string();
            if let Some(location) = self.locations.get_mut(&location_id) {
                let visit_text = location.text_on_visit.clone();
                location.visited = true;
                self.print(LineClass::Plain, &visit_text);
            } else {
                warn!("start location '{}' missing from graph", location_id);
            }
            // stale dialogue frames never survive a (re)start
            self.prompt_stack.clear();
            self.prompt_mode = false;
            self.check_for_prompt(&PromptPath::root(&location_id));
        }

        self.drain()
    }

    /// Process one player-typed line and return the turn's output.
    /// Once the game is won the session is terminal and input is ignored.
    pub fn submit(&mut self, input: &str, ext: &mut Extensions) -> Vec<OutputLine> {
        if self.game_victory {
            return Vec::new();
        }

        let command = input.to_lowercase();
        let command = command.trim();
        debug!("command received: {}", escape_log(command));

        let actionable = if self.prompt_mode {
            self.handle_prompt_input(command, ext)
        } else {
            match parse(command) {
                Intent::Help => {
                    self.display_help();
                    false
                }
                Intent::ShowInventory => {
                    self.display_inventory();
                    false
                }
                Intent::DescribeLocation => {
                    let description = self
                        .current_location()
                        .map(|l| l.description.clone())
                        .unwrap_or_default();
                    self.print(LineClass::Plain, &description);
                    false
                }
                Intent::PickUp(object) => self.handle_pickup(&object, ext),
                Intent::Examine(object) => {
                    self.handle_examine(&object, ext);
                    false
                }
                Intent::Move(direction) => self.handle_move(&direction, ext),
                Intent::Use { object, target } => {
                    self.handle_use(&object, target.as_deref(), ext)
                }
                Intent::Unrecognized(_) => {
                    self.print(LineClass::Error, "That instruction wasn't understood.");
                    false
                }
            }
        };

        // only state-changing turns persist and can win the game
        if actionable {
            self.save_progress();
            self.check_for_victory(ext);
        } else {
            debug!("turn was not actionable; skipping save and victory check");
        }

        self.drain()
    }

    /// Reset all runtime state, clear the save, and start over from the
    /// pristine definition.
    pub fn restart(&mut self, ext: &mut Extensions) -> Result<Vec<OutputLine>, EngineError> {
        debug!("restarting session");
        let definition: GameDefinition = serde_json::from_str(&self.pristine)?;
        self.used_objects.clear();
        self.prompt_stack.clear();
        self.prompt_mode = false;
        self.game_victory = false;
        self.output.clear();
        if let Some(store) = self.store.as_mut() {
            store.remove(SAVE_KEY_LOCATIONS);
            store.remove(SAVE_KEY_INVENTORY);
            store.remove(SAVE_KEY_LOCATION);
        }
        self.player = Player::new(
            definition.starting_inventory.clone(),
            &definition.start_location,
        );
        self.locations = definition.locations;
        self.victory = definition.victory;
        Ok(self.start(ext))
    }

    /// Whether the session has reached its terminal (victory) state.
    pub fn is_over(&self) -> bool {
        self.game_victory
    }

    /// Whether the session is waiting on a dialogue response.
    pub fn in_prompt_mode(&self) -> bool {
        self.prompt_mode
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn used_objects(&self) -> &HashSet<String> {
        &self.used_objects
    }

    pub fn locations(&self) -> &HashMap<String, Location> {
        &self.locations
    }

    /// Append a line to the turn transcript. Public so extension functions
    /// can speak through the session. Empty text is dropped.
    pub fn print_line(&mut self, class: LineClass, text: &str) {
        self.print(class, text);
    }

    // ------------------------------------------------------------------
    // Action handlers
    // ------------------------------------------------------------------

    fn handle_move(&mut self, token: &str, ext: &mut Extensions) -> bool {
        debug!("testing direction '{}'", escape_log(token));
        let lookup = match self.current_location() {
            None => MoveLookup::NoSuchDirection,
            Some(current) => {
                let key = if current.directions.contains_key(token) {
                    Some(token.to_string())
                } else {
                    // the target location's display name is accepted too
                    current
                        .directions
                        .iter()
                        .find(|(_, exit)| {
                            self.locations
                                .get(&exit.location)
                                .is_some_and(|target| target.name.to_lowercase() == token)
                        })
                        .map(|(key, _)| key.clone())
                };
                match key {
                    None => MoveLookup::NoSuchDirection,
                    Some(key) => {
                        let exit = &current.directions[&key];
                        if resolver::dependency_resolved(&self.player, current, &key) {
                            MoveLookup::Go(exit.location.clone())
                        } else {
                            MoveLookup::Blocked(exit.text_on_error.clone())
                        }
                    }
                }
            }
        };

        match lookup {
            MoveLookup::NoSuchDirection => {
                self.print(LineClass::Error, "That is not a possible direction.");
                false
            }
            MoveLookup::Blocked(text) => {
                self.print(LineClass::Error, &text);
                false
            }
            MoveLookup::Go(destination) => {
                if !self.locations.contains_key(&destination) {
                    warn!("direction leads to unknown location '{}'", destination);
                    self.print(LineClass::Error, "That is not a possible direction.");
                    return false;
                }
                self.move_to_location(&destination, ext);
                true
            }
        }
    }

    /// Relocate the player and run the arrival sequence.
    fn move_to_location(&mut self, destination: &str, ext: &mut Extensions) {
        debug!("moving to location '{}'", destination);
        // leaving a location always discards its dialogue frames
        self.prompt_stack.clear();
        self.prompt_mode = false;

        self.player.set_location(destination);
        let (visit_text, trigger) = match self.locations.get(destination) {
            Some(location) => (location.text_on_visit.clone(), location.visit_trigger.clone()),
            None => (String::new(), None),
        };
        self.print(LineClass::Plain, &visit_text);
        ext.fire(trigger.as_ref(), self);
        if let Some(location) = self.locations.get_mut(destination) {
            location.visited = true;
        }
        self.check_for_prompt(&PromptPath::root(destination));
    }

    fn handle_use(&mut self, object_q: &str, target_q: Option<&str>, ext: &mut Extensions) -> bool {
        debug!(
            "testing use: '{}' on '{}'",
            escape_log(object_q),
            escape_log(target_q.unwrap_or("-"))
        );
        let Some((object_ref, object)) = self.resolve_with_snapshot(object_q) else {
            self.print(
                LineClass::Error,
                &format!("There's no {} to use.", object_q),
            );
            return false;
        };
        match target_q {
            None => self.use_single(object_q, object_ref, object, ext),
            Some(target_q) => self.use_on_target(object_q, target_q, object_ref, object, ext),
        }
    }

    fn use_single(
        &mut self,
        object_q: &str,
        object_ref: ObjectRef,
        object: GameObject,
        ext: &mut Extensions,
    ) -> bool {
        if !object.can_use {
            // an object with a paired use gets the more helpful message
            let text = if object.can_use_on_object != UseTarget::None {
                format!("The {} can't be used that way.", object_q)
            } else {
                format!("The {} can't be used.", object_q)
            };
            self.print(LineClass::Error, &text);
            return false;
        }
        if !self.dependency_ok(object_q) {
            self.print(LineClass::Plain, &object.text_on_error);
            return false;
        }

        self.print(LineClass::Plain, &object.text_on_use);
        self.set_used(&object_ref);
        if object.remove_after_use {
            self.player.remove_item(&object_ref.id);
        }
        self.used_objects.insert(object_ref.id.clone());
        ext.fire(object.use_trigger.as_ref(), self);
        true
    }

    fn use_on_target(
        &mut self,
        object_q: &str,
        target_q: &str,
        object_ref: ObjectRef,
        object: GameObject,
        ext: &mut Extensions,
    ) -> bool {
        let Some((target_ref, target)) = self.resolve_with_snapshot(target_q) else {
            self.print(
                LineClass::Error,
                &format!("{} isn't here to use.", target_q),
            );
            return false;
        };
        // pairing is id-exact
        if object.can_use_on_object.as_id() != Some(target_ref.id.as_str()) {
            self.print(
                LineClass::Error,
                &format!("Can't use the {} that way.", object_q),
            );
            return false;
        }
        if !self.dependency_ok(object_q) {
            self.print(LineClass::Plain, &object.text_on_error);
            return false;
        }
        if !self.dependency_ok(target_q) {
            self.print(LineClass::Plain, &target.text_on_error);
            return false;
        }

        self.print(LineClass::Plain, &object.text_on_use_object_on);
        // the *target* is what ends up used
        self.set_used(&target_ref);
        if object.remove_after_use {
            self.player.remove_item(&object_ref.id);
        }
        self.used_objects.insert(object_ref.id.clone());
        ext.fire(object.use_trigger.as_ref(), self);
        true
    }

    fn handle_pickup(&mut self, object_q: &str, ext: &mut Extensions) -> bool {
        debug!("testing pickup: '{}'", escape_log(object_q));
        let Some((object_ref, object)) = self.resolve_with_snapshot(object_q) else {
            self.print(
                LineClass::Error,
                &format!("There's no {} to pick up.", object_q),
            );
            return false;
        };
        if !object.can_pickup {
            self.print(
                LineClass::Error,
                &format!("You can't pick up the {}.", object_q),
            );
            return false;
        }
        if object.picked_up || object_ref.scope == ObjectScope::Inventory {
            self.print(
                LineClass::Error,
                &format!("You have already picked up the {}.", object_q),
            );
            return false;
        }
        if !self.dependency_ok(object_q) {
            self.print(LineClass::Plain, &object.text_on_error);
            return false;
        }

        // relocate the node itself; the location copy is gone afterwards
        let location_id = self.player.location().to_string();
        let Some(mut taken) = self
            .locations
            .get_mut(&location_id)
            .and_then(|l| l.objects.remove(&object_ref.id))
        else {
            warn!("object '{}' vanished during pickup", object_ref.id);
            return false;
        };
        taken.picked_up = true;
        let line = if taken.text_on_pickup.is_empty() {
            format!("You put the {} in your inventory.", taken.name)
        } else {
            taken.text_on_pickup.clone()
        };
        self.print(LineClass::Plain, &line);
        let trigger = taken.pickup_trigger.clone();
        self.player.add_item(&object_ref.id, taken);
        ext.fire(trigger.as_ref(), self);
        true
    }

    fn handle_examine(&mut self, object_q: &str, ext: &mut Extensions) {
        debug!("testing examine: '{}'", escape_log(object_q));
        let Some((_, object)) = self.resolve_with_snapshot(object_q) else {
            self.print(
                LineClass::Error,
                &format!("{} is not something you can examine.", object_q),
            );
            return;
        };
        self.print(LineClass::Plain, &object.description);
        ext.fire(object.examine_trigger.as_ref(), self);
    }

    // ------------------------------------------------------------------
    // Dialogue state machine
    // ------------------------------------------------------------------

    /// Match a dialogue-mode line against the responses of the prompt on
    /// top of the stack.
    fn handle_prompt_input(&mut self, command: &str, ext: &mut Extensions) -> bool {
        let Some(frame) = self.prompt_stack.last().cloned() else {
            warn!("prompt mode with an empty stack; returning to normal mode");
            self.prompt_mode = false;
            return false;
        };
        let prompt_path = frame.prompt_path();
        let Some(prompt) = resolve_prompt(&self.locations, &prompt_path) else {
            warn!("active prompt '{}' no longer resolves", prompt_path);
            self.prompt_stack.clear();
            self.prompt_mode = false;
            return false;
        };

        // first declared response with a matching phrase wins
        let matched = prompt
            .responses
            .iter()
            .find(|r| r.valid_commands.iter().any(|phrase| phrase == command))
            .cloned();
        let Some(response) = matched else {
            self.print(LineClass::Error, "This wasn't a valid response.");
            return false;
        };

        debug!("response '{}' matched", response.id);
        self.print(LineClass::Plain, &response.response_text);

        if let Some(prompt) = resolve_prompt_mut(&mut self.locations, &prompt_path) {
            prompt.has_prompted = true;
        }
        let response_path = prompt_path.child(PathSeg::Response(response.id.clone()));
        if let Some(chosen) = resolve_response_mut(&mut self.locations, &response_path) {
            chosen.is_chosen = true;
        }

        ext.fire(response.response_trigger.as_ref(), self);

        if !response.receive_object.is_empty() {
            self.grant_object(&response.receive_object);
        }

        if !response.goto_location.is_empty() {
            // navigation ends the dialogue outright; the destination may
            // open a fresh one
            self.prompt_stack.clear();
            self.prompt_mode = false;
            if self.locations.contains_key(&response.goto_location) {
                self.move_to_location(&response.goto_location, ext);
            } else {
                warn!(
                    "response '{}' routes to unknown location '{}'",
                    response.id, response.goto_location
                );
            }
        } else {
            self.advance_after_response(&response_path);
        }
        true
    }

    /// Descend into the answered response's child prompts, or climb back up
    /// the stack until a prompt surfaces or dialogue ends.
    fn advance_after_response(&mut self, response_path: &PromptPath) {
        self.prompt_mode = false;
        if self.check_for_prompt(response_path) {
            return;
        }
        while let Some(frame) = self.prompt_stack.last() {
            let container = frame.container.clone();
            if self.check_for_prompt(&container) {
                return;
            }
            self.prompt_stack.pop();
        }
    }

    /// Scan a container's prompt set for the first eligible prompt. On a
    /// hit, push its frame, enter prompt mode, and show its text.
    fn check_for_prompt(&mut self, container: &PromptPath) -> bool {
        let Some(prompts) = prompts_at(&self.locations, container) else {
            return false;
        };
        let candidates: Vec<_> = prompts
            .iter()
            .map(|p| {
                (
                    p.id.clone(),
                    p.prompt_text.clone(),
                    p.has_prompted,
                    p.can_repeat,
                    p.prompt_conditions.clone(),
                )
            })
            .collect();
        let top = self.prompt_stack.last().cloned();

        for (id, text, has_prompted, can_repeat, conditions) in candidates {
            // the prompt currently on top was just shown; skip it
            if top
                .as_ref()
                .is_some_and(|f| f.container == *container && f.prompt_id == id)
            {
                debug!("prompt '{}' was just shown", id);
                continue;
            }
            if has_prompted && !can_repeat {
                debug!("prompt '{}' already shown and cannot repeat", id);
                continue;
            }
            if !conditions.iter().all(|c| condition_met(&self.locations, c)) {
                debug!("prompt '{}' conditions unmet", id);
                continue;
            }
            self.prompt_stack.push(PromptFrame {
                container: container.clone(),
                prompt_id: id,
            });
            self.prompt_mode = true;
            self.print(LineClass::Prompt, &text);
            return true;
        }
        false
    }

    /// Move a promised object from the current location into inventory.
    fn grant_object(&mut self, object_id: &str) {
        let location_id = self.player.location().to_string();
        let taken = self
            .locations
            .get_mut(&location_id)
            .and_then(|l| l.objects.remove(object_id));
        match taken {
            Some(mut object) => {
                debug!("granting object '{}'", object_id);
                object.picked_up = true;
                let pickup_text = object.text_on_pickup.clone();
                self.player.add_item(object_id, object);
                self.print(LineClass::Plain, &pickup_text);
            }
            None => warn!(
                "receive_object '{}' is not in location '{}'; verify the game data",
                object_id, location_id
            ),
        }
    }

    // ------------------------------------------------------------------
    // Victory and persistence
    // ------------------------------------------------------------------

    /// Evaluate the victory block; on a full pass the session goes
    /// terminal. Re-invocation after victory is a no-op.
    fn check_for_victory(&mut self, ext: &mut Extensions) {
        if self.game_victory {
            return;
        }
        if victory::conditions_met(
            &self.victory,
            &self.locations,
            &self.player,
            &self.used_objects,
        ) {
            let text = self.victory.victory_text.clone();
            self.print(LineClass::Victory, &text);
            self.game_victory = true;
            let trigger = self.victory.victory_trigger.clone();
            ext.fire(trigger.as_ref(), self);
        }
    }

    /// Write the three save keys. Failures are logged by the store and do
    /// not block the turn.
    fn save_progress(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        set_json(store.as_mut(), SAVE_KEY_LOCATIONS, &self.locations);
        set_json(store.as_mut(), SAVE_KEY_INVENTORY, self.player.inventory());
        store.set(SAVE_KEY_LOCATION, self.player.location());
        debug!("progress saved");
    }

    /// Restore a saved game when the store holds one; otherwise leave the
    /// fresh state untouched. The used-objects set is rebuilt from the
    /// `is_used` flags across locations and inventory.
    fn try_restore(&mut self) {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        let Some(location) = store.get(SAVE_KEY_LOCATION) else {
            debug!("no save found; starting a new game");
            return;
        };
        let locations: Option<HashMap<String, Location>> = get_json(store, SAVE_KEY_LOCATIONS);
        let inventory: Option<HashMap<String, GameObject>> = get_json(store, SAVE_KEY_INVENTORY);
        match (locations, inventory) {
            (Some(locations), Some(inventory)) if locations.contains_key(&location) => {
                debug!("local save found; resuming");
                self.locations = locations;
                self.player.set_inventory(inventory);
                self.player.set_location(&location);
                self.used_objects = self.collect_used_ids();
                self.print(LineClass::Info, "... Resuming game from previous save");
            }
            (Some(_), Some(_)) => {
                warn!("saved location '{}' unknown; starting fresh", location)
            }
            _ => warn!("saved game could not be decoded; starting fresh"),
        }
    }

    fn collect_used_ids(&self) -> HashSet<String> {
        let mut used = HashSet::new();
        for location in self.locations.values() {
            for (id, object) in &location.objects {
                if object.is_used {
                    used.insert(id.clone());
                }
            }
        }
        for (id, object) in self.player.inventory() {
            if object.is_used {
                used.insert(id.clone());
            }
        }
        used
    }

    // ------------------------------------------------------------------
    // Displays and shared lookups
    // ------------------------------------------------------------------

    fn display_help(&mut self) {
        self.print(
            LineClass::Help,
            "Explore all locations, collect items and solve puzzles to beat the game. \
             Here is a list of instructions you can use to get started:",
        );
        for (verb, what) in [
            ("help", "Displays this information"),
            ("inventory", "Displays the items in your character's inventory"),
            ("look around", "Take a look at your current location"),
            ("go", "Go in a specific direction (or to a specific location)"),
            ("pick up", "Pick up an object and put it in your inventory"),
            (
                "examine",
                "Take a closer look at an object in your inventory or in your current location",
            ),
            (
                "use",
                "Use an object in your inventory or location (on a specific object)",
            ),
        ] {
            self.print(LineClass::Help, &format!("{}: {}", verb, what));
        }
    }

    fn display_inventory(&mut self) {
        self.print(LineClass::Inventory, "Inventory");
        if self.player.inventory().is_empty() {
            self.print(LineClass::Inventory, "You are carrying nothing.");
            return;
        }
        let mut entries: Vec<_> = self
            .player
            .inventory()
            .values()
            .map(|o| format!("{}: {}", o.name, o.description))
            .collect();
        entries.sort();
        for entry in entries {
            self.print(LineClass::Inventory, &entry);
        }
    }

    fn current_location(&self) -> Option<&Location> {
        self.locations.get(self.player.location())
    }

    fn resolve_with_snapshot(&self, query: &str) -> Option<(ObjectRef, GameObject)> {
        let current = self.current_location()?;
        let r = resolver::resolve_object(&self.player, current, query)?;
        let object = resolver::object(&self.player, current, &r)?.clone();
        Some((r, object))
    }

    fn dependency_ok(&self, query: &str) -> bool {
        match self.current_location() {
            Some(current) => resolver::dependency_resolved(&self.player, current, query),
            None => false,
        }
    }

    fn set_used(&mut self, r: &ObjectRef) {
        let location_id = self.player.location().to_string();
        let object = match r.scope {
            ObjectScope::Inventory => self.player.item_mut(&r.id),
            ObjectScope::Location => self
                .locations
                .get_mut(&location_id)
                .and_then(|l| l.objects.get_mut(&r.id)),
        };
        if let Some(object) = object {
            object.is_used = true;
        }
    }

    fn print(&mut self, class: LineClass, text: &str) {
        // authored texts are frequently empty; empty lines are dropped
        if text.is_empty() {
            return;
        }
        self.output.push(OutputLine::new(class, text));
    }

    fn drain(&mut self) -> Vec<OutputLine> {
        std::mem::take(&mut self.output)
    }
}
