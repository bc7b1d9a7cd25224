//! Loopback EMM and ESM layers
//!
//! In-memory layers that complete every procedure immediately instead of
//! talking to a network. They record each primitive they accept, can be told
//! to refuse the next one, and emit the indications a real layer would emit
//! on the corresponding state change.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nextgsim_common::{Imsi, Msisdn, PdnType, Plmn};
use tracing::{debug, trace, warn};

use super::emm::{
    AccessTechnology, MobilityLayer, OperatorId, PlmnFormat, PlmnSelectionMode, RegistrationStatus,
};
use super::esm::{PdnAddress, PdnContext, SessionLayer, DEFAULT_PDN_CID};
use super::indication::{Indication, IndicationSender};
use super::sap::{EmmPrimitive, EsmPrimitive, SapError};

/// Operator known to the loopback mobility layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackOperator {
    /// PLMN identity
    pub plmn: Plmn,
    /// Long alphanumeric name
    pub long_name: String,
    /// Short alphanumeric name
    pub short_name: String,
    /// Access technology
    pub rat: AccessTechnology,
}

impl LoopbackOperator {
    /// E-UTRAN operator with generated names.
    pub fn eutran(plmn: Plmn) -> Self {
        Self {
            plmn,
            long_name: format!("Test PLMN {plmn}"),
            short_name: format!("TEST{plmn}"),
            rat: AccessTechnology::Eutran,
        }
    }

    fn matches(&self, operator: &OperatorId) -> bool {
        match operator {
            OperatorId::LongName(name) => &self.long_name == name,
            OperatorId::ShortName(name) => &self.short_name == name,
            OperatorId::Numeric(plmn) => &self.plmn == plmn,
        }
    }

    fn render(&self, format: PlmnFormat) -> String {
        match format {
            PlmnFormat::LongAlpha => self.long_name.clone(),
            PlmnFormat::ShortAlpha => self.short_name.clone(),
            PlmnFormat::Numeric => self.plmn.to_string(),
        }
    }
}

/// Mobility layer that attaches and registers on request.
#[derive(Debug)]
pub struct LoopbackMobility {
    imsi: Option<Imsi>,
    msisdn: Option<Msisdn>,
    imei: Option<String>,
    hplmn: Plmn,
    operators: Vec<LoopbackOperator>,
    mode: PlmnSelectionMode,
    format: PlmnFormat,
    selected: Option<usize>,
    status: RegistrationStatus,
    tac: u16,
    ci: u32,
    s1_enabled: bool,
    attached: bool,
    emergency: bool,
    indications: Option<IndicationSender>,
    bearers: Option<BearerLink>,
    sent: Vec<EmmPrimitive<'static>>,
    reject_next: Option<String>,
}

impl LoopbackMobility {
    /// Creates a layer with a subscriber record and the home PLMN as the only
    /// available operator.
    pub fn new(imsi: Imsi, hplmn: Plmn) -> Self {
        Self {
            imsi: Some(imsi),
            msisdn: None,
            imei: None,
            hplmn,
            operators: vec![LoopbackOperator::eutran(hplmn)],
            mode: PlmnSelectionMode::Automatic,
            format: PlmnFormat::LongAlpha,
            selected: None,
            status: RegistrationStatus::NotRegistered,
            tac: 0,
            ci: 0,
            s1_enabled: false,
            attached: false,
            emergency: false,
            indications: None,
            bearers: None,
            sent: Vec::new(),
            reject_next: None,
        }
    }

    /// Lets attach and detach drive the PDN connections of a loopback
    /// session layer.
    pub fn link_bearers(&mut self, link: BearerLink) {
        self.bearers = Some(link);
    }

    /// Sets the subscriber MSISDN.
    pub fn set_msisdn(&mut self, msisdn: Option<Msisdn>) {
        self.msisdn = msisdn;
    }

    /// Adds an available operator.
    pub fn add_operator(&mut self, operator: LoopbackOperator) {
        self.operators.push(operator);
    }

    /// Forces the attach state without going through a procedure.
    pub fn set_attached(&mut self, attached: bool, is_emergency: bool) {
        self.attached = attached;
        self.emergency = attached && is_emergency;
    }

    /// Refuses the next primitive with `reason`.
    pub fn reject_next(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    /// Primitives accepted so far, oldest first.
    pub fn sent(&self) -> &[EmmPrimitive<'static>] {
        &self.sent
    }

    /// Forgets recorded primitives.
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Returns true between `initialize` and `cleanup`.
    pub fn is_initialized(&self) -> bool {
        self.indications.is_some()
    }

    /// IMEI received at initialization.
    pub fn imei(&self) -> Option<&str> {
        self.imei.as_deref()
    }

    /// Whether the EPS capability is enabled.
    pub fn is_s1_enabled(&self) -> bool {
        self.s1_enabled
    }

    fn notify(&self, indication: Indication) {
        trace!("EMM indication: {}", indication);
        if let Some(tx) = &self.indications {
            if tx.send(indication).is_err() {
                debug!("Indication receiver dropped");
            }
        }
    }

    fn notify_registration(&self) {
        self.notify(Indication::Registration {
            status: self.status,
            tac: self.tac,
            ci: self.ci,
            rat: self.plmn_rat(),
        });
    }

    fn set_status(&mut self, status: RegistrationStatus) {
        if self.status != status {
            self.status = status;
            self.notify_registration();
        }
    }

    fn home_or_roaming(&self, index: usize) -> RegistrationStatus {
        match self.operators.get(index) {
            Some(op) if op.plmn == self.hplmn => RegistrationStatus::RegisteredHome,
            Some(_) => RegistrationStatus::RegisteredRoaming,
            None => RegistrationStatus::Denied,
        }
    }

    fn find_operator(
        &self,
        operator: Option<&OperatorId>,
        act: Option<AccessTechnology>,
    ) -> Option<usize> {
        let operator = operator?;
        self.operators
            .iter()
            .position(|op| op.matches(operator) && act.map_or(true, |act| op.rat == act))
    }

    fn automatic_selection(&self) -> Option<usize> {
        self.operators
            .iter()
            .position(|op| op.plmn == self.hplmn)
            .or_else(|| (!self.operators.is_empty()).then_some(0))
    }

    fn apply(&mut self, primitive: &EmmPrimitive<'_>) -> Result<(), SapError> {
        match primitive {
            EmmPrimitive::S1Enabled => self.s1_enabled = true,
            EmmPrimitive::S1Disabled => self.s1_enabled = false,
            EmmPrimitive::RegisterReq { index } => {
                if *index >= self.operators.len() {
                    return Err(SapError::Rejected {
                        primitive: primitive.name(),
                        reason: format!("no PLMN at index {index}"),
                    });
                }
                self.selected = Some(*index);
                let status = self.home_or_roaming(*index);
                self.set_status(status);
            }
            EmmPrimitive::AttachInit { is_emergency } => {
                if self.selected.is_none() {
                    self.selected = self.automatic_selection();
                }
                let Some(index) = self.selected else {
                    return Err(SapError::Rejected {
                        primitive: primitive.name(),
                        reason: "no PLMN available".into(),
                    });
                };
                self.attached = true;
                self.emergency = *is_emergency;
                let status = self.home_or_roaming(index);
                self.set_status(status);
                if let Some(bearers) = &self.bearers {
                    bearers.attached();
                }
                self.notify(Indication::Attach {
                    attached: true,
                    is_emergency: *is_emergency,
                });
            }
            EmmPrimitive::DetachInit { .. } => {
                let was_attached = self.attached;
                self.attached = false;
                self.emergency = false;
                self.set_status(RegistrationStatus::NotRegistered);
                if was_attached {
                    if let Some(bearers) = &self.bearers {
                        bearers.detached();
                    }
                    self.notify(Indication::Attach {
                        attached: false,
                        is_emergency: false,
                    });
                }
            }
            EmmPrimitive::CellInfoRes {
                found, tac, cell_id, ..
            } => {
                if *found {
                    self.tac = *tac;
                    self.ci = *cell_id;
                }
            }
            EmmPrimitive::EstablishCnf { .. }
            | EmmPrimitive::EstablishRej
            | EmmPrimitive::ReleaseInd { .. }
            | EmmPrimitive::DataInd { .. } => {}
        }
        Ok(())
    }
}

impl MobilityLayer for LoopbackMobility {
    fn initialize(&mut self, indications: IndicationSender, imei: &str) {
        debug!("Loopback EMM initialized: imei={}", imei);
        self.indications = Some(indications);
        self.imei = Some(imei.to_owned());
    }

    fn cleanup(&mut self) {
        debug!("Loopback EMM released");
        self.indications = None;
    }

    fn select_plmn(
        &mut self,
        mode: PlmnSelectionMode,
        format: PlmnFormat,
        operator: Option<&OperatorId>,
        act: Option<AccessTechnology>,
    ) -> Option<usize> {
        self.format = format;
        match mode {
            PlmnSelectionMode::Automatic => {
                self.mode = mode;
                self.automatic_selection()
            }
            PlmnSelectionMode::Manual => {
                self.mode = mode;
                self.find_operator(operator, act)
            }
            PlmnSelectionMode::ManualAutomatic => {
                self.mode = mode;
                self.find_operator(operator, act)
                    .or_else(|| self.automatic_selection())
            }
            PlmnSelectionMode::Deregister => None,
            PlmnSelectionMode::SetFormatOnly => self.selected,
        }
    }

    fn imsi(&self) -> Option<Imsi> {
        self.imsi
    }

    fn msisdn(&self) -> Option<Msisdn> {
        self.msisdn.clone()
    }

    fn plmn_selection_mode(&self) -> PlmnSelectionMode {
        self.mode
    }

    fn selected_plmn(&self, format: PlmnFormat) -> Option<String> {
        self.selected
            .and_then(|index| self.operators.get(index))
            .map(|op| op.render(format))
    }

    fn plmn_rat(&self) -> Option<AccessTechnology> {
        self.selected
            .and_then(|index| self.operators.get(index))
            .map(|op| op.rat)
    }

    fn plmn_list(&self) -> String {
        self.operators
            .iter()
            .enumerate()
            .map(|(index, op)| {
                let stat = if Some(index) == self.selected { 2 } else { 1 };
                format!(
                    "({},\"{}\",\"{}\",\"{}\",{})",
                    stat,
                    op.long_name,
                    op.short_name,
                    op.plmn,
                    u8::from(op.rat)
                )
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn plmn_status(&self) -> RegistrationStatus {
        self.status
    }

    fn plmn_tac(&self) -> u16 {
        self.tac
    }

    fn plmn_ci(&self) -> u32 {
        self.ci
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn is_emergency(&self) -> bool {
        self.emergency
    }

    fn send(&mut self, primitive: EmmPrimitive<'_>) -> Result<(), SapError> {
        if self.indications.is_none() {
            return Err(SapError::NotInitialized("EMM"));
        }
        if let Some(reason) = self.reject_next.take() {
            warn!("Loopback EMM refusing {}: {}", primitive, reason);
            return Err(SapError::Rejected {
                primitive: primitive.name(),
                reason,
            });
        }
        trace!("Loopback EMM received {}", primitive);
        self.apply(&primitive)?;
        self.sent.push(primitive.into_owned());
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PdnEntry {
    context: PdnContext,
    address: Option<PdnAddress>,
}

/// PDN context table shared between the loopback session layer and the
/// bearer link held by the loopback mobility layer.
#[derive(Debug)]
struct PdnTable {
    contexts: Vec<Option<PdnEntry>>,
    indications: Option<IndicationSender>,
}

impl PdnTable {
    fn slot_mut(&mut self, cid: u8) -> Option<&mut Option<PdnEntry>> {
        usize::from(cid)
            .checked_sub(1)
            .and_then(|index| self.contexts.get_mut(index))
    }

    fn entry(&self, cid: u8) -> Option<&PdnEntry> {
        usize::from(cid)
            .checked_sub(1)
            .and_then(|index| self.contexts.get(index))
            .and_then(Option::as_ref)
    }

    fn notify(&self, indication: Indication) {
        trace!("ESM indication: {}", indication);
        if let Some(tx) = &self.indications {
            if tx.send(indication).is_err() {
                debug!("Indication receiver dropped");
            }
        }
    }

    /// Marks a defined context active. Returns false if `cid` is undefined.
    fn connect(&mut self, cid: u8) -> bool {
        let Some(Some(entry)) = self.slot_mut(cid) else {
            return false;
        };
        entry.context.is_active = true;
        entry.address = Some(allocate_address(cid, entry.context.pdn_type));
        self.notify(Indication::PdnState { cid, active: true });
        true
    }

    /// Marks a defined context inactive. Returns false if `cid` is undefined.
    fn disconnect(&mut self, cid: u8) -> bool {
        let Some(Some(entry)) = self.slot_mut(cid) else {
            return false;
        };
        entry.context.is_active = false;
        entry.address = None;
        self.notify(Indication::PdnState { cid, active: false });
        true
    }

    fn cids(&self) -> impl Iterator<Item = u8> {
        1..=u8::try_from(self.contexts.len()).unwrap_or(u8::MAX)
    }
}

fn allocate_address(cid: u8, pdn_type: PdnType) -> PdnAddress {
    let ipv4 = Ipv4Addr::new(10, 45, 0, cid.saturating_add(1));
    let ipv6 = Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, u16::from(cid) + 1);
    match pdn_type {
        PdnType::Ipv4 => PdnAddress {
            ipv4: Some(ipv4),
            ipv6: None,
        },
        PdnType::Ipv6 => PdnAddress {
            ipv4: None,
            ipv6: Some(ipv6),
        },
        PdnType::Ipv4v6 => PdnAddress {
            ipv4: Some(ipv4),
            ipv6: Some(ipv6),
        },
    }
}

fn lock(table: &Mutex<PdnTable>) -> MutexGuard<'_, PdnTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle through which the loopback mobility layer drives the PDN
/// connections that follow attach and detach.
///
/// Attach brings up the default PDN connection (cid 1) when it is defined.
/// Detach releases every connection and clears the table.
#[derive(Debug, Clone)]
pub struct BearerLink {
    table: Arc<Mutex<PdnTable>>,
}

impl BearerLink {
    fn attached(&self) {
        let mut table = lock(&self.table);
        let default_active = table
            .entry(DEFAULT_PDN_CID)
            .map(|entry| entry.context.is_active);
        match default_active {
            Some(false) => {
                debug!("Default PDN connection established at attach");
                table.connect(DEFAULT_PDN_CID);
            }
            Some(true) => {}
            None => debug!("No default PDN context defined, attaching without PDN connection"),
        }
    }

    fn detached(&self) {
        let mut table = lock(&self.table);
        let active: Vec<u8> = table
            .cids()
            .filter(|&cid| table.entry(cid).is_some_and(|entry| entry.context.is_active))
            .collect();
        for cid in active {
            table.disconnect(cid);
        }
        table.contexts.iter_mut().for_each(|slot| *slot = None);
        debug!("PDN context table cleared at detach");
    }
}

/// Session layer that connects and disconnects PDNs on request.
#[derive(Debug)]
pub struct LoopbackSession {
    table: Arc<Mutex<PdnTable>>,
    initialized: bool,
    sent: Vec<EsmPrimitive>,
    reject_next: Option<String>,
}

impl LoopbackSession {
    /// Creates a layer with `max_pdn_contexts` empty slots.
    pub fn new(max_pdn_contexts: u8) -> Self {
        Self {
            table: Arc::new(Mutex::new(PdnTable {
                contexts: vec![None; usize::from(max_pdn_contexts)],
                indications: None,
            })),
            initialized: false,
            sent: Vec::new(),
            reject_next: None,
        }
    }

    /// Handle for [`LoopbackMobility::link_bearers`].
    pub fn bearer_link(&self) -> BearerLink {
        BearerLink {
            table: Arc::clone(&self.table),
        }
    }

    /// Places a context in slot `cid` directly, assigning addresses when it
    /// is active. Out-of-range cids are ignored.
    pub fn insert_context(&mut self, cid: u8, context: PdnContext) {
        let address = context
            .is_active
            .then(|| allocate_address(cid, context.pdn_type));
        if let Some(slot) = self.table().slot_mut(cid) {
            *slot = Some(PdnEntry { context, address });
        }
    }

    /// Forces the active flag of a defined context.
    pub fn set_active(&mut self, cid: u8, active: bool) {
        if let Some(Some(entry)) = self.table().slot_mut(cid) {
            entry.context.is_active = active;
            entry.address = active.then(|| allocate_address(cid, entry.context.pdn_type));
        }
    }

    /// Refuses the next primitive with `reason`.
    pub fn reject_next(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    /// Primitives accepted so far, oldest first.
    pub fn sent(&self) -> &[EsmPrimitive] {
        &self.sent
    }

    /// Forgets recorded primitives.
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Returns true between `initialize` and `cleanup`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn table(&self) -> MutexGuard<'_, PdnTable> {
        lock(&self.table)
    }

    fn apply(&self, primitive: &EsmPrimitive) -> Result<(), SapError> {
        let name = primitive.name();
        let reject = |reason: String| SapError::Rejected {
            primitive: name,
            reason,
        };
        let mut table = self.table();

        match primitive {
            EsmPrimitive::PdnConnectivityReq {
                cid,
                is_defined: false,
                pdn_type,
                apn,
                is_emergency,
            } => {
                let slot = table
                    .slot_mut(*cid)
                    .ok_or_else(|| reject(format!("cid {cid} out of range")))?;
                if slot.as_ref().is_some_and(|entry| entry.context.is_active) {
                    return Err(reject(format!("PDN connection {cid} is active")));
                }
                *slot = Some(PdnEntry {
                    context: PdnContext::new(*pdn_type, apn.clone(), *is_emergency),
                    address: None,
                });
            }
            EsmPrimitive::PdnConnectivityReq {
                cid,
                is_defined: true,
                ..
            } => {
                if !table.connect(*cid) {
                    return Err(reject(format!("PDN context {cid} is not defined")));
                }
            }
            EsmPrimitive::PdnConnectivityRej { cid } => {
                if let Some(slot) = table.slot_mut(*cid) {
                    *slot = None;
                }
            }
            EsmPrimitive::PdnDisconnectReq { cid } => {
                if !table.disconnect(*cid) {
                    return Err(reject(format!("PDN context {cid} is not defined")));
                }
            }
        }
        Ok(())
    }
}

impl SessionLayer for LoopbackSession {
    fn initialize(&mut self, indications: IndicationSender) {
        let mut table = self.table();
        debug!("Loopback ESM initialized: {} PDN context slots", table.contexts.len());
        table.indications = Some(indications);
        drop(table);
        self.initialized = true;
    }

    fn cleanup(&mut self) {
        debug!("Loopback ESM released");
        self.table().indications = None;
        self.initialized = false;
    }

    fn max_pdn_contexts(&self) -> u8 {
        u8::try_from(self.table().contexts.len()).unwrap_or(u8::MAX)
    }

    fn pdn_status(&self, cid: u8) -> Option<bool> {
        self.table().entry(cid).map(|entry| entry.context.is_active)
    }

    fn pdn(&self, cid: u8) -> Option<PdnContext> {
        self.table().entry(cid).map(|entry| entry.context.clone())
    }

    fn active_pdn_count(&self) -> usize {
        self.table()
            .contexts
            .iter()
            .flatten()
            .filter(|entry| entry.context.is_active)
            .count()
    }

    fn pdn_address(&self, cid: u8) -> Option<PdnAddress> {
        self.table().entry(cid).and_then(|entry| entry.address)
    }

    fn send(&mut self, primitive: EsmPrimitive) -> Result<(), SapError> {
        if !self.initialized {
            return Err(SapError::NotInitialized("ESM"));
        }
        if let Some(reason) = self.reject_next.take() {
            warn!("Loopback ESM refusing {}: {}", primitive, reason);
            return Err(SapError::Rejected {
                primitive: primitive.name(),
                reason,
            });
        }
        trace!("Loopback ESM received {}", primitive);
        self.apply(&primitive)?;
        self.sent.push(primitive);
        Ok(())
    }
}
